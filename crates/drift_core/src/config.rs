//! Configuration management for benchmark parameters.
//!
//! Strongly-typed sections mapping to `drift.toml`. Every section has
//! defaults, so a partial file only overrides what it names.
//!
//! ## Example `drift.toml`
//!
//! ```toml
//! [physics]
//! speed = 0.02
//! ice_friction = 0.1
//!
//! [controller]
//! learning_rate = 0.01
//!
//! [benchmark]
//! duration_ms = 3000
//! window_ms = 500
//! schedule = ["sand"]
//! ```

use crate::clock::ClockMode;
use crate::controller::ControllerSettings;
use crate::harness::{ExperimentConfig, RunPlan, TerrainSchedule};
use crate::terrain::TerrainPhysics;
use crate::training::TrainingConfig;
use drift_data::{SimulationState, TerrainType};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Timing and layout of the benchmark run.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct BenchmarkConfig {
    pub duration_ms: u64,
    pub window_ms: u64,
    /// When set, each tick advances a simulated clock by this many
    /// microseconds instead of reading wall time.
    pub fixed_step_us: Option<u64>,
    pub seed: u64,
    /// One entry keeps the terrain fixed; more entries split the run evenly.
    pub schedule: Vec<TerrainType>,
    pub agent_start: [f32; 2],
    pub target_start: [f32; 2],
    /// Run all four capability combinations instead of the baseline pair.
    pub matrix: bool,
    pub parallel: bool,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            duration_ms: 3000,
            window_ms: 500,
            fixed_step_us: None,
            seed: 42,
            schedule: vec![TerrainType::Sand],
            agent_start: [0.1, 0.1],
            target_start: [0.9, 0.9],
            matrix: false,
            parallel: false,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct AppConfig {
    pub physics: TerrainPhysics,
    pub controller: ControllerSettings,
    pub training: TrainingConfig,
    pub benchmark: BenchmarkConfig,
}

impl AppConfig {
    /// Validates all configuration parameters.
    pub fn validate(&self) -> anyhow::Result<()> {
        let p = &self.physics;
        anyhow::ensure!(p.speed > 0.0 && p.speed <= 1.0, "Speed must be in (0.0, 1.0]");
        anyhow::ensure!(
            p.ice_friction > 0.0 && p.ice_friction <= 1.0,
            "Ice friction must be in (0.0, 1.0]"
        );
        anyhow::ensure!(
            p.sand_repeat_factor >= 0.0 && p.sand_change_factor >= 0.0,
            "Sand factors must be non-negative"
        );
        anyhow::ensure!(p.grass_damping >= 0.0, "Grass damping must be non-negative");

        let c = &self.controller;
        anyhow::ensure!(
            c.learning_rate >= 0.0 && c.learning_rate <= 1.0,
            "Learning rate must be in [0.0, 1.0]"
        );
        anyhow::ensure!(c.success_epsilon >= 0.0, "Success epsilon must be non-negative");
        anyhow::ensure!(c.target_threshold > 0.0, "Target threshold must be positive");
        anyhow::ensure!(
            c.sensor_noise >= 0.0 && c.sensor_noise <= 1.0,
            "Sensor noise must be in [0.0, 1.0]"
        );

        let t = &self.training;
        anyhow::ensure!(
            t.retarget_chance >= 0.0 && t.retarget_chance <= 1.0,
            "Retarget chance must be in [0.0, 1.0]"
        );
        anyhow::ensure!(!t.terrains.is_empty(), "Classifier terrains must not be empty");

        let b = &self.benchmark;
        anyhow::ensure!(b.duration_ms > 0, "Benchmark duration must be positive");
        anyhow::ensure!(b.window_ms > 0, "Window interval must be positive");
        anyhow::ensure!(
            b.window_ms <= b.duration_ms,
            "Window interval exceeds the benchmark duration"
        );
        anyhow::ensure!(
            b.fixed_step_us != Some(0),
            "Fixed step must be positive when set"
        );
        anyhow::ensure!(!b.schedule.is_empty(), "Terrain schedule must not be empty");
        anyhow::ensure!(
            b.agent_start
                .iter()
                .chain(&b.target_start)
                .all(|v| (0.0..=1.0).contains(v)),
            "Start positions must lie in [0,1]"
        );

        Ok(())
    }

    /// Parses and validates a TOML document.
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config = toml::from_str::<Self>(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Stable digest of the parameters that influence results.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(format!("{:?}", self.physics).as_bytes());
        hasher.update(format!("{:?}", self.controller).as_bytes());
        hasher.update(format!("{:?}", self.training).as_bytes());
        hasher.update(format!("{:?}", self.benchmark).as_bytes());
        hex::encode(hasher.finalize())
    }

    #[must_use]
    pub fn run_plan(&self) -> RunPlan {
        let b = &self.benchmark;
        let schedule = match b.schedule.as_slice() {
            [single] => TerrainSchedule::Fixed(*single),
            many => TerrainSchedule::Sequence(many.to_vec()),
        };
        let start_terrain = b.schedule.first().copied().unwrap_or_default();
        RunPlan {
            duration: Duration::from_millis(b.duration_ms),
            window: Duration::from_millis(b.window_ms),
            clock: match b.fixed_step_us {
                Some(us) => ClockMode::FixedStep(Duration::from_micros(us)),
                None => ClockMode::Wall,
            },
            schedule,
            start: SimulationState::new(b.agent_start, b.target_start, start_terrain),
            seed: b.seed,
        }
    }

    #[must_use]
    pub fn experiments(&self) -> Vec<ExperimentConfig> {
        if self.benchmark.matrix {
            ExperimentConfig::matrix()
        } else {
            ExperimentConfig::simple()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [benchmark]
            duration_ms = 1000
            window_ms = 250
            schedule = ["road", "sand", "ice", "grass"]
            "#,
        )
        .unwrap();
        assert_eq!(config.benchmark.duration_ms, 1000);
        assert_eq!(config.physics, TerrainPhysics::default());
        let plan = config.run_plan();
        assert_eq!(plan.max_windows(), 4);
        assert!(matches!(plan.schedule, TerrainSchedule::Sequence(ref s) if s.len() == 4));
        assert_eq!(plan.start.terrain, TerrainType::Road);
    }

    #[test]
    fn test_invalid_window() {
        let config = AppConfig {
            benchmark: BenchmarkConfig {
                window_ms: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_friction() {
        let config = AppConfig {
            physics: TerrainPhysics {
                ice_friction: 1.5,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_fixed_step_plan() {
        let config = AppConfig {
            benchmark: BenchmarkConfig {
                fixed_step_us: Some(1000),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(
            config.run_plan().clock,
            ClockMode::FixedStep(Duration::from_millis(1))
        );
        assert_eq!(config.experiments().len(), 2);
    }

    #[test]
    fn test_fingerprint_consistency() {
        let a = AppConfig::default();
        let mut b = AppConfig::default();
        assert_eq!(a.fingerprint(), b.fingerprint());
        b.physics.speed = 0.03;
        assert_ne!(a.fingerprint(), b.fingerprint());
    }
}
