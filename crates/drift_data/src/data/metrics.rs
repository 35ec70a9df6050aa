use super::terrain::TerrainType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The two independent switches a benchmark configuration toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Capabilities {
    /// Relay source activations into the target input.
    pub coupling: bool,
    /// Apply reward-shaped local updates to the target each tick.
    pub adaptation: bool,
}

impl Capabilities {
    #[must_use]
    pub const fn new(coupling: bool, adaptation: bool) -> Self {
        Self {
            coupling,
            adaptation,
        }
    }

    /// Full cross-product, isolated first.
    #[must_use]
    pub fn matrix() -> [Capabilities; 4] {
        [
            Self::new(false, false),
            Self::new(true, false),
            Self::new(false, true),
            Self::new(true, true),
        ]
    }

    /// Isolated baseline against the fully coupled, adaptive navigator.
    #[must_use]
    pub fn simple() -> [Capabilities; 2] {
        [Self::new(false, false), Self::new(true, true)]
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match (self.coupling, self.adaptation) {
            (false, false) => "isolated",
            (true, false) => "coupled",
            (false, true) => "adaptive",
            (true, true) => "coupled+adaptive",
        }
    }
}

/// Outcome counts for one sealed window.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WindowMetrics {
    pub index: usize,
    /// Terrain with the most ticks in this window.
    pub terrain: TerrainType,
    pub targets_reached: u64,
    pub total_steps: u64,
    /// Ticks whose action strictly reduced the distance to target.
    pub effective_steps: u64,
    pub accuracy: f64,
}

impl WindowMetrics {
    #[must_use]
    pub fn new(
        index: usize,
        terrain: TerrainType,
        targets_reached: u64,
        total_steps: u64,
        effective_steps: u64,
    ) -> Self {
        Self {
            index,
            terrain,
            targets_reached,
            total_steps,
            effective_steps,
            accuracy: ratio(effective_steps, total_steps),
        }
    }
}

/// Final, immutable result of one benchmark configuration.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ExperimentResult {
    pub name: String,
    pub capabilities: Capabilities,
    pub windows: Vec<WindowMetrics>,
    pub total_targets: u64,
    pub total_steps: u64,
    pub total_effective: u64,
    pub accuracy: f64,
    pub terrain_targets: BTreeMap<TerrainType, u64>,
}

impl ExperimentResult {
    /// Reduces sealed windows into totals.
    #[must_use]
    pub fn from_windows(
        name: impl Into<String>,
        capabilities: Capabilities,
        windows: Vec<WindowMetrics>,
        terrain_targets: BTreeMap<TerrainType, u64>,
    ) -> Self {
        let total_targets = windows.iter().map(|w| w.targets_reached).sum();
        let total_steps = windows.iter().map(|w| w.total_steps).sum();
        let total_effective = windows.iter().map(|w| w.effective_steps).sum();
        Self {
            name: name.into(),
            capabilities,
            windows,
            total_targets,
            total_steps,
            total_effective,
            accuracy: ratio(total_effective, total_steps),
            terrain_targets,
        }
    }

    #[must_use]
    pub fn steps_per_target(&self) -> Option<f64> {
        (self.total_targets > 0).then(|| self.total_steps as f64 / self.total_targets as f64)
    }
}

fn ratio(num: u64, den: u64) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}
