//! # DRIFT Core
//!
//! Neural-link coupling benchmark engine.
//!
//! A frozen terrain classifier is wired into a navigator through a
//! declared activation link. The harness measures whether the relayed
//! signal, optionally combined with online adaptation, makes the navigator
//! reach more targets on terrain it was never trained on.
//!
//! This crate contains:
//! - The `NeuralModel` contract and a reference dense network
//! - Link validation, activation relay and injection
//! - Terrain physics and sensor generation
//! - The per-tick controller with online correction
//! - The windowed benchmark harness and pretraining phases
//!
//! ## Example
//!
//! ```
//! use drift_core::model::{Activation, DenseNetwork, DenseSpec, LayerSpec, NeuralModel};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let mut rng = ChaCha8Rng::seed_from_u64(42);
//! let spec = DenseSpec::new(vec![
//!     LayerSpec::new(8, 16, Activation::LeakyRelu),
//!     LayerSpec::new(16, 4, Activation::Sigmoid),
//! ]);
//! let mut net = DenseNetwork::from_spec(&spec, &mut rng).unwrap();
//! let out = net.forward(&[0.5; 8]).unwrap();
//! assert_eq!(out.len(), 4);
//! assert_eq!(net.internal_stage(0).map(<[f32]>::len), Some(16));
//! ```

/// Time sources for the benchmark loop
pub mod clock;
/// Configuration management for benchmark parameters
pub mod config;
/// Per-tick navigation with relay and online correction
pub mod controller;
pub mod error;
/// Windowed benchmark harness and suite comparison
pub mod harness;
/// Link validation against model shapes
pub mod link;
/// Run counters and logging setup
pub mod metrics;
/// Model contract and the reference dense network
pub mod model;
pub mod relay;
pub mod sensors;
/// Terrain physics and sensor profiles
pub mod terrain;
/// Classifier and navigator pretraining
pub mod training;

pub use config::AppConfig;
pub use controller::{Controller, ControllerSettings, ControllerSetup, NamedModel, TickOutcome};
pub use error::{DriftError, Result};
pub use harness::{Benchmark, ExperimentConfig, RunPlan, SuiteReport, TerrainSchedule};
pub use link::LinkSet;
pub use metrics::{init_logging, Metrics};
pub use model::{DenseNetwork, NeuralModel};
pub use terrain::{TerrainLogic, TerrainPhysics};
pub use training::TrainingConfig;
