mod common;

use drift_core::harness::ExperimentConfig;
use drift_data::{Capabilities, TerrainType};

#[test]
fn test_isolated_500_ticks_on_sand_is_one_deterministic_window() {
    let run = || {
        let (classifier, navigator) = common::default_pair(7);
        common::tick_benchmark(500, 500)
            .run(
                &ExperimentConfig::from_capabilities(Capabilities::new(false, false)),
                classifier,
                navigator,
            )
            .unwrap()
    };

    let first = run();
    assert_eq!(first.windows.len(), 1);
    let window = &first.windows[0];
    assert_eq!(window.total_steps, 500);
    assert_eq!(window.terrain, TerrainType::Sand);
    assert!(window.effective_steps <= window.total_steps);

    let second = run();
    assert_eq!(first.windows[0].targets_reached, second.windows[0].targets_reached);
    assert_eq!(first, second);
}

#[test]
fn test_every_capability_combination_completes() {
    let (classifier, navigator) = common::default_pair(3);
    let report = common::tick_benchmark(1000, 250).run_suite(
        &ExperimentConfig::matrix(),
        &classifier,
        &navigator,
    );
    assert!(report.failures.is_empty());
    let names: Vec<_> = report.results.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["isolated", "coupled", "adaptive", "coupled+adaptive"]);
    for r in &report.results {
        assert_eq!(r.windows.len(), 4);
        assert_eq!(r.total_steps, 1000);
        assert_eq!(
            r.terrain_targets.values().sum::<u64>(),
            r.total_targets,
            "per-terrain targets of {} must add up",
            r.name
        );
    }
    assert!(report.best().is_some());
}

#[test]
fn test_suite_is_reproducible_from_the_same_pair() {
    let (classifier, navigator) = common::default_pair(9);
    let report = common::tick_benchmark(400, 400).run_suite(
        &ExperimentConfig::simple(),
        &classifier,
        &navigator,
    );
    assert_eq!(report.results.len(), 2);

    // Each configuration works on its own copy of the pair.
    let again = common::tick_benchmark(400, 400).run_suite(
        &ExperimentConfig::simple(),
        &classifier,
        &navigator,
    );
    assert_eq!(report, again);
}
