//! DRIFT: neural-link coupling benchmark.
//!
//! The library half of the `drift` binary. Engine types live in the
//! workspace crates and are re-exported here under `model`.

pub mod experiment;
pub mod render;

pub mod model {
    pub use drift_core::{
        AppConfig, Benchmark, DriftError, ExperimentConfig, NeuralModel, RunPlan, SuiteReport,
    };
    pub use drift_data::*;
    pub use drift_io::{DriftConfig, IoError, RunReport};

    pub mod config {
        pub use drift_core::config::*;
    }
    pub mod harness {
        pub use drift_core::harness::*;
    }
    pub mod terrain {
        pub use drift_core::terrain::*;
    }
}

pub use experiment::{default_drift_config, run_experiment, ExperimentOutcome};
