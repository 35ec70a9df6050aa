//! Windowed benchmark harness.
//!
//! Runs a controller for a fixed duration per configuration, seals outcome
//! windows at a fixed interval and compares the resulting
//! `ExperimentResult`s.

use crate::clock::ClockMode;
use crate::controller::{
    AxisAlternation, Controller, ControllerSettings, ControllerSetup, CorrectionPolicy,
    NamedModel, TickOutcome,
};
use crate::error::{DriftError, Result};
use crate::metrics::Metrics;
use crate::model::NeuralModel;
use crate::terrain::TerrainPhysics;
use drift_data::{
    Capabilities, ExperimentResult, LinkDescriptor, SimulationState, TerrainType, WindowMetrics,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// A candidate must beat the baseline by this factor to count as an
/// improvement.
pub const SIGNIFICANCE_FACTOR: f64 = 1.1;

/// Which terrain is active over the run.
#[derive(Debug, Clone, PartialEq)]
pub enum TerrainSchedule {
    Fixed(TerrainType),
    /// Evenly spaced segments of the run, in order, holding the last entry.
    Sequence(Vec<TerrainType>),
}

impl TerrainSchedule {
    #[must_use]
    pub fn terrain_at(&self, elapsed: Duration, total: Duration) -> TerrainType {
        match self {
            TerrainSchedule::Fixed(t) => *t,
            TerrainSchedule::Sequence(seq) => {
                let n = seq.len() as u128;
                if n == 0 || total.is_zero() {
                    return seq.first().copied().unwrap_or_default();
                }
                let idx = (elapsed.as_nanos() * n / total.as_nanos()).min(n - 1) as usize;
                seq[idx]
            }
        }
    }
}

/// Timing, terrain and starting conditions shared by every configuration.
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub duration: Duration,
    pub window: Duration,
    pub clock: ClockMode,
    pub schedule: TerrainSchedule,
    pub start: SimulationState,
    pub seed: u64,
}

impl RunPlan {
    #[must_use]
    pub fn wall_clock(duration: Duration, window: Duration) -> Self {
        Self {
            duration,
            window,
            clock: ClockMode::Wall,
            schedule: TerrainSchedule::Fixed(TerrainType::Sand),
            start: SimulationState::new([0.1, 0.1], [0.9, 0.9], TerrainType::Sand),
            seed: 42,
        }
    }

    /// Tick-budgeted plan: each tick counts as one simulated millisecond.
    #[must_use]
    pub fn ticks(total: u64, window: u64) -> Self {
        Self {
            clock: ClockMode::FixedStep(Duration::from_millis(1)),
            ..Self::wall_clock(Duration::from_millis(total), Duration::from_millis(window))
        }
    }

    #[must_use]
    pub fn with_schedule(mut self, schedule: TerrainSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    #[must_use]
    pub fn with_start(mut self, start: SimulationState) -> Self {
        self.start = start;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Number of windows a complete run seals.
    #[must_use]
    pub fn max_windows(&self) -> usize {
        if self.window.is_zero() {
            return 0;
        }
        (self.duration.as_nanos() / self.window.as_nanos()) as usize
    }

    pub fn validate(&self) -> Result<()> {
        if self.duration.is_zero() || self.window.is_zero() {
            return Err(DriftError::configuration(
                "run duration and window must be positive",
            ));
        }
        if let TerrainSchedule::Sequence(seq) = &self.schedule {
            if seq.is_empty() {
                return Err(DriftError::configuration("terrain schedule is empty"));
            }
        }
        if let ClockMode::FixedStep(step) = self.clock {
            if step.is_zero() {
                return Err(DriftError::configuration("fixed clock step must be positive"));
            }
        }
        Ok(())
    }
}

/// A named point in the capability cross-product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperimentConfig {
    pub name: String,
    pub capabilities: Capabilities,
}

impl ExperimentConfig {
    #[must_use]
    pub fn new(name: impl Into<String>, capabilities: Capabilities) -> Self {
        Self {
            name: name.into(),
            capabilities,
        }
    }

    #[must_use]
    pub fn from_capabilities(capabilities: Capabilities) -> Self {
        Self::new(capabilities.label(), capabilities)
    }

    #[must_use]
    pub fn matrix() -> Vec<Self> {
        Capabilities::matrix()
            .into_iter()
            .map(Self::from_capabilities)
            .collect()
    }

    #[must_use]
    pub fn simple() -> Vec<Self> {
        Capabilities::simple()
            .into_iter()
            .map(Self::from_capabilities)
            .collect()
    }
}

/// Open window accumulator.
#[derive(Debug, Default)]
struct WindowAccumulator {
    index: usize,
    terrain_ticks: [u64; TerrainType::COUNT],
    terrain_targets: [u64; TerrainType::COUNT],
    targets: u64,
    total: u64,
    effective: u64,
}

impl WindowAccumulator {
    fn new(index: usize) -> Self {
        Self {
            index,
            ..Default::default()
        }
    }

    fn record(&mut self, outcome: &TickOutcome) {
        let t = outcome.terrain.index();
        self.terrain_ticks[t] += 1;
        self.total += 1;
        if outcome.effective {
            self.effective += 1;
        }
        if outcome.reached_target {
            self.targets += 1;
            self.terrain_targets[t] += 1;
        }
    }

    fn dominant_terrain(&self) -> TerrainType {
        let mut best = 0;
        for (i, &count) in self.terrain_ticks.iter().enumerate() {
            if count > self.terrain_ticks[best] {
                best = i;
            }
        }
        TerrainType::from_index(best).unwrap_or_default()
    }

    fn seal(self) -> (WindowMetrics, [u64; TerrainType::COUNT]) {
        let metrics = WindowMetrics::new(
            self.index,
            self.dominant_terrain(),
            self.targets,
            self.total,
            self.effective,
        );
        (metrics, self.terrain_targets)
    }
}

/// Runs configurations against a fixed plan and link set.
#[derive(Debug, Clone)]
pub struct Benchmark {
    pub plan: RunPlan,
    pub links: Vec<LinkDescriptor>,
    pub source_id: String,
    pub target_id: String,
    pub physics: TerrainPhysics,
    pub settings: ControllerSettings,
    pub metrics: Arc<Metrics>,
}

impl Benchmark {
    #[must_use]
    pub fn new(
        plan: RunPlan,
        source_id: impl Into<String>,
        target_id: impl Into<String>,
        links: Vec<LinkDescriptor>,
    ) -> Self {
        Self {
            plan,
            links,
            source_id: source_id.into(),
            target_id: target_id.into(),
            physics: TerrainPhysics::default(),
            settings: ControllerSettings::default(),
            metrics: Arc::new(Metrics::new()),
        }
    }

    #[must_use]
    pub fn with_physics(mut self, physics: TerrainPhysics) -> Self {
        self.physics = physics;
        self
    }

    #[must_use]
    pub fn with_settings(mut self, settings: ControllerSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn run<S: NeuralModel, T: NeuralModel>(
        &self,
        config: &ExperimentConfig,
        source: S,
        target: T,
    ) -> Result<ExperimentResult> {
        self.run_with_policy(config, source, target, AxisAlternation)
    }

    /// Runs one configuration to completion. Any error discards the
    /// windows collected so far.
    pub fn run_with_policy<S, T, P>(
        &self,
        config: &ExperimentConfig,
        source: S,
        target: T,
        policy: P,
    ) -> Result<ExperimentResult>
    where
        S: NeuralModel,
        T: NeuralModel,
        P: CorrectionPolicy,
    {
        self.plan.validate()?;
        let setup = ControllerSetup {
            links: self.links.clone(),
            capabilities: config.capabilities,
            physics: self.physics.clone(),
            settings: self.settings.clone(),
            seed: self.plan.seed,
        };
        let mut controller = Controller::with_policy(
            NamedModel::new(self.source_id.clone(), source),
            NamedModel::new(self.target_id.clone(), target),
            setup,
            policy,
        )?;

        let plan = &self.plan;
        let max_windows = plan.max_windows();
        let mut state = plan.start.clone();
        let mut clock = plan.clock.start();
        let mut windows = Vec::with_capacity(max_windows);
        let mut terrain_targets = [0u64; TerrainType::COUNT];
        let mut open = WindowAccumulator::new(0);
        let mut window_start = Duration::ZERO;

        while clock.elapsed() < plan.duration {
            state.set_terrain(plan.schedule.terrain_at(clock.elapsed(), plan.duration));
            let outcome = controller.tick(&mut state)?;
            open.record(&outcome);
            self.metrics.record_tick(outcome.reached_target);
            clock.advance();

            if windows.len() < max_windows
                && clock.elapsed().saturating_sub(window_start) >= plan.window
            {
                let next = WindowAccumulator::new(windows.len() + 1);
                let (metrics, targets) = std::mem::replace(&mut open, next).seal();
                tracing::debug!(
                    config = %config.name,
                    window = metrics.index,
                    terrain = metrics.terrain.name(),
                    targets = metrics.targets_reached,
                    steps = metrics.total_steps,
                    accuracy = metrics.accuracy,
                    "Window sealed"
                );
                for (sum, t) in terrain_targets.iter_mut().zip(targets) {
                    *sum += t;
                }
                windows.push(metrics);
                self.metrics.record_window();
                window_start += plan.window;
            }
        }

        let per_terrain: BTreeMap<TerrainType, u64> = TerrainType::ALL
            .iter()
            .zip(terrain_targets)
            .filter(|(_, n)| *n > 0)
            .map(|(t, n)| (*t, n))
            .collect();
        let result =
            ExperimentResult::from_windows(&config.name, config.capabilities, windows, per_terrain);
        tracing::info!(
            config = %result.name,
            windows = result.windows.len(),
            targets = result.total_targets,
            steps = result.total_steps,
            accuracy = result.accuracy,
            "Configuration finished"
        );
        Ok(result)
    }

    /// Runs each configuration in order on fresh copies of the models.
    pub fn run_suite<S, T>(&self, configs: &[ExperimentConfig], source: &S, target: &T) -> SuiteReport
    where
        S: NeuralModel + Clone,
        T: NeuralModel + Clone,
    {
        let outcomes = configs
            .iter()
            .map(|c| (c.name.clone(), self.run(c, source.clone(), target.clone())))
            .collect();
        self.finish_suite(outcomes)
    }

    /// Like [`Benchmark::run_suite`], one rayon task per configuration.
    #[cfg(feature = "parallel")]
    pub fn run_suite_parallel<S, T>(
        &self,
        configs: &[ExperimentConfig],
        source: &S,
        target: &T,
    ) -> SuiteReport
    where
        S: NeuralModel + Clone + Send + Sync,
        T: NeuralModel + Clone + Send + Sync,
    {
        use rayon::prelude::*;

        let outcomes = configs
            .par_iter()
            .map(|c| (c.name.clone(), self.run(c, source.clone(), target.clone())))
            .collect();
        self.finish_suite(outcomes)
    }
}

impl Benchmark {
    fn finish_suite(&self, outcomes: Vec<(String, Result<ExperimentResult>)>) -> SuiteReport {
        let report = SuiteReport::collect(outcomes);
        for _ in &report.failures {
            self.metrics.increment_counter("configurations_failed");
        }
        tracing::info!(
            completed = report.results.len(),
            failed = report.failures.len(),
            ticks = self.metrics.tick_count(),
            ticks_per_sec = self.metrics.throughput(),
            "Suite finished"
        );
        report
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFailure {
    pub name: String,
    pub error: DriftError,
}

/// Results of every configuration in a suite.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SuiteReport {
    pub results: Vec<ExperimentResult>,
    pub failures: Vec<ConfigFailure>,
}

impl SuiteReport {
    fn collect(outcomes: Vec<(String, Result<ExperimentResult>)>) -> Self {
        let mut report = Self::default();
        for (name, outcome) in outcomes {
            match outcome {
                Ok(result) => report.results.push(result),
                Err(error) => {
                    tracing::warn!(config = %name, error = %error, "Configuration aborted");
                    report.failures.push(ConfigFailure { name, error });
                }
            }
        }
        report
    }

    #[must_use]
    pub fn find(&self, name: &str) -> Option<&ExperimentResult> {
        self.results.iter().find(|r| r.name == name)
    }

    /// Configuration with the most targets reached; earlier wins ties.
    #[must_use]
    pub fn best(&self) -> Option<&ExperimentResult> {
        let mut best: Option<&ExperimentResult> = None;
        for r in &self.results {
            if best.map_or(true, |b| r.total_targets > b.total_targets) {
                best = Some(r);
            }
        }
        best
    }

    /// Target ratio candidate / baseline; `None` if either is missing or
    /// the baseline reached nothing.
    #[must_use]
    pub fn improvement(&self, baseline: &str, candidate: &str) -> Option<f64> {
        let b = self.find(baseline)?;
        let c = self.find(candidate)?;
        (b.total_targets > 0).then(|| c.total_targets as f64 / b.total_targets as f64)
    }

    /// Whether `candidate` reached more than `SIGNIFICANCE_FACTOR` times the
    /// baseline's targets.
    #[must_use]
    pub fn outperforms(&self, candidate: &str, baseline: &str) -> Option<bool> {
        let b = self.find(baseline)?;
        let c = self.find(candidate)?;
        Some(c.total_targets as f64 > b.total_targets as f64 * SIGNIFICANCE_FACTOR)
    }
}
