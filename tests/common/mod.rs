use drift_core::model::DenseNetwork;
use drift_lib::experiment::{default_drift_config, ModelPair};
use drift_lib::model::harness::{Benchmark, RunPlan};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;
use uuid::Uuid;

/// Untrained classifier/navigator pair built from the default drift config.
#[allow(dead_code)]
pub fn default_pair(seed: u64) -> (DenseNetwork, DenseNetwork) {
    let drift = default_drift_config().unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let pair = ModelPair::build(&drift, &mut rng).unwrap();
    (pair.classifier, pair.navigator)
}

/// Benchmark over the default link with a tick budget.
#[allow(dead_code)]
pub fn tick_benchmark(ticks: u64, window: u64) -> Benchmark {
    let drift = default_drift_config().unwrap();
    Benchmark::new(
        RunPlan::ticks(ticks, window),
        "classifier",
        "navigator",
        drift.links().to_vec(),
    )
}

/// Unique scratch path under the system temp directory.
#[allow(dead_code)]
pub fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir()
        .join(format!("drift_test_{}", Uuid::new_v4()))
        .join(name)
}
