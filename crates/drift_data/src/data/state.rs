use super::terrain::{Action, TerrainType};
use serde::{Deserialize, Serialize};

/// Mutable per-run simulation record, threaded explicitly through every
/// controller call.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SimulationState {
    /// Agent position in [0,1]².
    pub agent: [f32; 2],
    /// Target position in [0,1]².
    pub target: [f32; 2],
    pub terrain: TerrainType,
    pub last_action: Option<Action>,
    /// Consecutive repeats of `last_action`, used by sand.
    pub stuck_count: u32,
    /// Persistent velocity, used by ice.
    pub velocity: [f32; 2],
}

impl Default for SimulationState {
    fn default() -> Self {
        Self::new([0.1, 0.1], [0.9, 0.9], TerrainType::Road)
    }
}

impl SimulationState {
    #[must_use]
    pub fn new(agent: [f32; 2], target: [f32; 2], terrain: TerrainType) -> Self {
        Self {
            agent,
            target,
            terrain,
            last_action: None,
            stuck_count: 0,
            velocity: [0.0, 0.0],
        }
    }

    /// Vector from agent to target.
    #[must_use]
    pub fn delta_to_target(&self) -> [f32; 2] {
        [
            self.target[0] - self.agent[0],
            self.target[1] - self.agent[1],
        ]
    }

    #[must_use]
    pub fn distance_to_target(&self) -> f32 {
        let [dx, dy] = self.delta_to_target();
        (dx * dx + dy * dy).sqrt()
    }

    /// Switches terrain. Terrain-specific memory is dropped only on an
    /// actual change.
    pub fn set_terrain(&mut self, terrain: TerrainType) {
        if self.terrain != terrain {
            self.terrain = terrain;
            self.stuck_count = 0;
            self.velocity = [0.0, 0.0];
        }
    }

    pub fn clear_motion(&mut self) {
        self.last_action = None;
        self.stuck_count = 0;
        self.velocity = [0.0, 0.0];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance() {
        let state = SimulationState::new([0.0, 0.0], [0.3, 0.4], TerrainType::Road);
        assert!((state.distance_to_target() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_set_terrain_resets_memory_on_change() {
        let mut state = SimulationState::new([0.5, 0.5], [0.9, 0.9], TerrainType::Ice);
        state.velocity = [0.01, 0.0];
        state.stuck_count = 2;
        state.last_action = Some(Action::Right);

        state.set_terrain(TerrainType::Ice);
        assert_eq!(state.velocity, [0.01, 0.0]);
        assert_eq!(state.stuck_count, 2);

        state.set_terrain(TerrainType::Sand);
        assert_eq!(state.velocity, [0.0, 0.0]);
        assert_eq!(state.stuck_count, 0);
        assert_eq!(state.last_action, Some(Action::Right));
    }
}
