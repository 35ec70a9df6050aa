//! End-to-end benchmark orchestration: build models from a drift config,
//! pretrain them, then run every configuration against the same pair.

use anyhow::{Context, Result};
use drift_core::config::AppConfig;
use drift_core::harness::{Benchmark, SuiteReport};
use drift_core::model::{Activation, DenseNetwork, DenseSpec, LayerSpec};
use drift_core::training::{train_classifier, train_navigator_road_only, TrainingReport};
use drift_data::{Capabilities, LinkDescriptor};
use drift_io::{DriftConfig, RunReport};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub const CLASSIFIER_ID: &str = "classifier";
pub const NAVIGATOR_ID: &str = "navigator";
pub const LINK_NAME: &str = "classifier_to_navigator";

/// Classifier and navigator wired by one 16-wide link from the
/// classifier's second stage into navigator inputs 4..20.
pub fn default_drift_config() -> drift_io::Result<DriftConfig> {
    let mut config = DriftConfig::new("NeuralLinkExperiment");
    config.add_model(
        CLASSIFIER_ID,
        &DenseSpec::new(vec![
            LayerSpec::new(8, 32, Activation::LeakyRelu).with_comment("sensor processing"),
            LayerSpec::new(32, 16, Activation::LeakyRelu).with_comment("link source"),
            LayerSpec::new(16, 4, Activation::Sigmoid).with_comment("terrain class"),
        ]),
    )?;
    config.add_model(
        NAVIGATOR_ID,
        &DenseSpec::new(vec![
            LayerSpec::new(20, 32, Activation::LeakyRelu).with_comment("task features and link"),
            LayerSpec::new(32, 16, Activation::LeakyRelu).with_comment("decision"),
            LayerSpec::new(16, 4, Activation::Sigmoid).with_comment("movement actions"),
        ]),
    )?;
    config.add_link(
        LinkDescriptor::new(LINK_NAME, CLASSIFIER_ID, 1, NAVIGATOR_ID, 4, 16)
            .with_description("classifier hidden activations into navigator input[4:20]"),
    );
    Ok(config)
}

/// Switches the benchmark to a simulated clock of one millisecond per tick.
pub fn apply_tick_budget(config: &mut AppConfig, ticks: u64, window_ticks: u64) {
    config.benchmark.duration_ms = ticks;
    config.benchmark.window_ms = window_ticks;
    config.benchmark.fixed_step_us = Some(1000);
}

/// Source and target identifiers; taken from the first link, or the
/// default pair when the document has none.
fn model_ids(drift: &DriftConfig) -> (String, String) {
    drift.links().first().map_or_else(
        || (CLASSIFIER_ID.to_string(), NAVIGATOR_ID.to_string()),
        |l| (l.source_model.clone(), l.target_model.clone()),
    )
}

#[derive(Debug, Clone)]
pub struct ModelPair {
    pub source_id: String,
    pub target_id: String,
    pub classifier: DenseNetwork,
    pub navigator: DenseNetwork,
}

impl ModelPair {
    pub fn build(drift: &DriftConfig, rng: &mut ChaCha8Rng) -> Result<Self> {
        drift.validate().context("invalid drift config")?;
        let (source_id, target_id) = model_ids(drift);
        let classifier = DenseNetwork::from_spec(&drift.model_spec(&source_id)?, rng)
            .with_context(|| format!("building model '{}'", source_id))?;
        let navigator = DenseNetwork::from_spec(&drift.model_spec(&target_id)?, rng)
            .with_context(|| format!("building model '{}'", target_id))?;
        tracing::info!(source = %source_id, target = %target_id, "Models built");
        Ok(Self {
            source_id,
            target_id,
            classifier,
            navigator,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ExperimentOutcome {
    pub classifier_training: TrainingReport,
    pub navigator_training: TrainingReport,
    pub suite: SuiteReport,
}

impl ExperimentOutcome {
    /// Report comparing coupled+adaptive against the isolated baseline.
    #[must_use]
    pub fn report(&self, app: &AppConfig, drift_name: &str) -> RunReport {
        let baseline = Capabilities::new(false, false).label();
        let candidate = Capabilities::new(true, true).label();
        RunReport::from_suite(&self.suite, app.fingerprint(), drift_name)
            .with_comparison(&self.suite, baseline, candidate)
    }
}

/// Builds, pretrains and benchmarks the model pair. Model construction
/// and pretraining draw from one RNG seeded by the benchmark seed.
pub fn run_experiment(app: &AppConfig, drift: &DriftConfig) -> Result<ExperimentOutcome> {
    app.validate()?;
    let mut rng = ChaCha8Rng::seed_from_u64(app.benchmark.seed);
    let mut pair = ModelPair::build(drift, &mut rng)?;

    let classifier_training = train_classifier(
        &mut pair.classifier,
        &app.training,
        app.controller.sensor_noise,
        &mut rng,
    )
    .context("classifier pretraining failed")?;
    let navigator_training =
        train_navigator_road_only(&mut pair.navigator, &app.training, &app.physics, &mut rng)
            .context("navigator pretraining failed")?;

    let benchmark = Benchmark::new(
        app.run_plan(),
        pair.source_id.clone(),
        pair.target_id.clone(),
        drift.links().to_vec(),
    )
    .with_physics(app.physics.clone())
    .with_settings(app.controller.clone());

    let configs = app.experiments();
    let suite = if app.benchmark.parallel {
        run_parallel(&benchmark, &configs, &pair)
    } else {
        benchmark.run_suite(&configs, &pair.classifier, &pair.navigator)
    };

    Ok(ExperimentOutcome {
        classifier_training,
        navigator_training,
        suite,
    })
}

#[cfg(feature = "parallel")]
fn run_parallel(
    benchmark: &Benchmark,
    configs: &[drift_core::harness::ExperimentConfig],
    pair: &ModelPair,
) -> SuiteReport {
    benchmark.run_suite_parallel(configs, &pair.classifier, &pair.navigator)
}

#[cfg(not(feature = "parallel"))]
fn run_parallel(
    benchmark: &Benchmark,
    configs: &[drift_core::harness::ExperimentConfig],
    pair: &ModelPair,
) -> SuiteReport {
    tracing::warn!("Built without the parallel feature, running sequentially");
    benchmark.run_suite(configs, &pair.classifier, &pair.navigator)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick_config() -> AppConfig {
        let mut app = AppConfig::default();
        app.training.classifier_ticks = 200;
        app.training.navigator_ticks = 200;
        apply_tick_budget(&mut app, 600, 200);
        app
    }

    #[test]
    fn test_default_drift_config_validates() {
        let drift = default_drift_config().unwrap();
        assert_eq!(drift.validate().unwrap().len(), 1);
        assert_eq!(model_ids(&drift), (CLASSIFIER_ID.into(), NAVIGATOR_ID.into()));
    }

    #[test]
    fn test_run_experiment_produces_both_configs() {
        let outcome = run_experiment(&quick_config(), &default_drift_config().unwrap()).unwrap();
        assert!(outcome.suite.failures.is_empty());
        assert_eq!(outcome.suite.results.len(), 2);
        for r in &outcome.suite.results {
            assert_eq!(r.windows.len(), 3);
            assert_eq!(r.total_steps, 600);
        }
        assert_eq!(outcome.classifier_training.samples, 200);
    }

    #[test]
    fn test_run_experiment_is_deterministic() {
        let drift = default_drift_config().unwrap();
        let a = run_experiment(&quick_config(), &drift).unwrap();
        let b = run_experiment(&quick_config(), &drift).unwrap();
        assert_eq!(a.suite, b.suite);
    }

    #[test]
    fn test_missing_model_is_reported() {
        let mut drift = default_drift_config().unwrap();
        drift.models.remove(NAVIGATOR_ID);
        assert!(run_experiment(&quick_config(), &drift).is_err());
    }
}
