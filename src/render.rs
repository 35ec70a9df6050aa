//! Plain-text rendering of benchmark results for the console.

use crate::experiment::ExperimentOutcome;
use drift_core::harness::SIGNIFICANCE_FACTOR;
use drift_core::terrain::TerrainLogic;
use drift_data::ExperimentResult;
use drift_io::RunReport;
use std::fmt::Write;

fn result_row(out: &mut String, r: &ExperimentResult) {
    let per_target = r
        .steps_per_target()
        .map_or_else(|| "-".to_string(), |s| format!("{s:.0}"));
    let _ = writeln!(
        out,
        "{:<18} {:>8} {:>9} {:>8.1}% {:>12} {:>8}",
        r.name,
        r.total_targets,
        r.total_steps,
        r.accuracy * 100.0,
        per_target,
        r.windows.len()
    );
}

/// Per-window breakdown of one configuration.
#[must_use]
pub fn render_windows(r: &ExperimentResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}:", r.name);
    for w in &r.windows {
        let _ = writeln!(
            out,
            "  window {:>3} {} {:<6} targets {:>4}  steps {:>6}  accuracy {:>5.1}%",
            w.index,
            w.terrain.symbol(),
            w.terrain.name(),
            w.targets_reached,
            w.total_steps,
            w.accuracy * 100.0
        );
    }
    out
}

/// Results table, training summary and the coupling verdict.
#[must_use]
pub fn render_outcome(outcome: &ExperimentOutcome, report: &RunReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Classifier pretraining: {:.1}% over {} samples",
        outcome.classifier_training.accuracy() * 100.0,
        outcome.classifier_training.samples
    );
    let _ = writeln!(
        out,
        "Navigator pretraining (road only): {:.1}% over {} samples",
        outcome.navigator_training.accuracy() * 100.0,
        outcome.navigator_training.samples
    );
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{:<18} {:>8} {:>9} {:>9} {:>12} {:>8}",
        "configuration", "targets", "steps", "accuracy", "steps/target", "windows"
    );
    for r in &outcome.suite.results {
        result_row(&mut out, r);
    }
    for f in &outcome.suite.failures {
        let _ = writeln!(out, "{:<18} failed: {}", f.name, f.error);
    }

    let _ = writeln!(out);
    if let Some(best) = &report.best {
        let _ = writeln!(out, "Best configuration: {best}");
    }
    match &report.comparison {
        Some(c) if c.significant => {
            let _ = writeln!(
                out,
                "{} beats {} by more than {SIGNIFICANCE_FACTOR}x: coupling helps",
                c.candidate, c.baseline
            );
        }
        Some(c) => {
            let ratio = c
                .ratio
                .map_or_else(|| "n/a".to_string(), |r| format!("{r:.2}x"));
            let _ = writeln!(
                out,
                "{} vs {}: {ratio}, results inconclusive",
                c.candidate, c.baseline
            );
        }
        None => {
            let _ = writeln!(out, "No comparison available");
        }
    }
    out
}
