//! Terrain transition function: turns a requested action into an actual
//! position change under per-terrain resistance, momentum and repetition
//! penalties.

pub use drift_data::{Action, SimulationState, TerrainType};
use serde::{Deserialize, Serialize};

/// Number of sensor channels a terrain profile exposes.
pub const SENSOR_WIDTH: usize = 8;

pub trait TerrainLogic {
    /// Noise-free sensor reading characteristic of the terrain.
    fn sensor_profile(&self) -> [f32; SENSOR_WIDTH];
    fn symbol(&self) -> char;
    /// True when the transition depends on state carried across ticks.
    fn has_memory(&self) -> bool;
}

impl TerrainLogic for TerrainType {
    fn sensor_profile(&self) -> [f32; SENSOR_WIDTH] {
        match self {
            TerrainType::Road => [0.9, 0.1, 0.7, 0.2, 0.5, 0.3, 0.8, 0.95],
            TerrainType::Sand => [0.3, 0.85, 0.9, 0.7, 0.75, 0.2, 0.25, 0.35],
            TerrainType::Ice => [0.95, 0.05, 0.15, 0.9, 0.1, 0.85, 0.6, 0.4],
            TerrainType::Grass => [0.5, 0.4, 0.45, 0.35, 0.9, 0.65, 0.5, 0.6],
        }
    }

    fn symbol(&self) -> char {
        match self {
            TerrainType::Road => '═',
            TerrainType::Sand => '░',
            TerrainType::Ice => '❄',
            TerrainType::Grass => '♣',
        }
    }

    fn has_memory(&self) -> bool {
        matches!(self, TerrainType::Sand | TerrainType::Ice)
    }
}

/// Tunable constants of the transition function.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TerrainPhysics {
    /// Base step magnitude per tick.
    pub speed: f32,
    /// Sand: repeats beyond this count stop the agent.
    pub sand_stuck_threshold: u32,
    pub sand_repeat_factor: f32,
    pub sand_change_factor: f32,
    /// Ice: weight of the requested direction in the velocity filter.
    pub ice_friction: f32,
    pub grass_damping: f32,
}

impl Default for TerrainPhysics {
    fn default() -> Self {
        Self {
            speed: 0.02,
            sand_stuck_threshold: 2,
            sand_repeat_factor: 0.3,
            sand_change_factor: 1.5,
            ice_friction: 0.1,
            grass_damping: 0.8,
        }
    }
}

impl TerrainPhysics {
    /// Advances `state` by one tick of `action` on its current terrain.
    ///
    /// Only position, velocity, stuck count and last action are touched.
    pub fn apply_action(&self, state: &mut SimulationState, action: Action) {
        let [ux, uy] = action.unit_vector();
        let step = match state.terrain {
            TerrainType::Road => [ux * self.speed, uy * self.speed],
            TerrainType::Grass => {
                let s = self.speed * self.grass_damping;
                [ux * s, uy * s]
            }
            TerrainType::Sand => {
                let s = if state.last_action == Some(action) {
                    state.stuck_count += 1;
                    if state.stuck_count > self.sand_stuck_threshold {
                        0.0
                    } else {
                        self.speed * self.sand_repeat_factor
                    }
                } else {
                    state.stuck_count = 0;
                    self.speed * self.sand_change_factor
                };
                [ux * s, uy * s]
            }
            TerrainType::Ice => {
                let f = self.ice_friction;
                state.velocity = [
                    state.velocity[0] * (1.0 - f) + ux * self.speed * f,
                    state.velocity[1] * (1.0 - f) + uy * self.speed * f,
                ];
                state.velocity
            }
        };

        state.agent[0] = (state.agent[0] + step[0]).clamp(0.0, 1.0);
        state.agent[1] = (state.agent[1] + step[1]).clamp(0.0, 1.0);
        state.last_action = Some(action);
    }
}

/// Greedy move along the dominant axis toward the target.
#[must_use]
pub fn optimal_action(state: &SimulationState) -> Action {
    let [dx, dy] = state.delta_to_target();
    if dx.abs() > dy.abs() {
        if dx > 0.0 {
            Action::Right
        } else {
            Action::Left
        }
    } else if dy > 0.0 {
        Action::Up
    } else {
        Action::Down
    }
}
