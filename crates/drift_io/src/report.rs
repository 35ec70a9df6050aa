//! Run reports: everything a benchmark run produced, written as JSON.

use crate::error::Result;
use crate::serialization::{read_json_file, write_json_file};
use drift_core::harness::SuiteReport;
use drift_data::ExperimentResult;
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FailureRecord {
    pub name: String,
    pub error: String,
}

/// Ratio of targets reached between two configurations.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Comparison {
    pub baseline: String,
    pub candidate: String,
    pub ratio: Option<f64>,
    pub significant: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RunReport {
    pub run_id: Uuid,
    /// RFC 3339 timestamp.
    pub created_at: String,
    /// Fingerprint of the configuration that produced the run.
    pub fingerprint: String,
    pub drift_config: String,
    pub results: Vec<ExperimentResult>,
    pub failures: Vec<FailureRecord>,
    pub best: Option<String>,
    pub comparison: Option<Comparison>,
}

impl RunReport {
    #[must_use]
    pub fn from_suite(
        suite: &SuiteReport,
        fingerprint: impl Into<String>,
        drift_config: impl Into<String>,
    ) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            created_at: chrono::Utc::now().to_rfc3339(),
            fingerprint: fingerprint.into(),
            drift_config: drift_config.into(),
            results: suite.results.clone(),
            failures: suite
                .failures
                .iter()
                .map(|f| FailureRecord {
                    name: f.name.clone(),
                    error: f.error.to_string(),
                })
                .collect(),
            best: suite.best().map(|r| r.name.clone()),
            comparison: None,
        }
    }

    /// Records how `candidate` fared against `baseline`. Missing
    /// configurations leave the comparison unset.
    #[must_use]
    pub fn with_comparison(mut self, suite: &SuiteReport, baseline: &str, candidate: &str) -> Self {
        self.comparison = suite
            .outperforms(candidate, baseline)
            .map(|significant| Comparison {
                baseline: baseline.to_string(),
                candidate: candidate.to_string(),
                ratio: suite.improvement(baseline, candidate),
                significant,
            });
        self
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        write_json_file(self, &path)?;
        tracing::info!(run_id = %self.run_id, path = ?path.as_ref(), "Run report written");
        Ok(())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        read_json_file(path)
    }
}
