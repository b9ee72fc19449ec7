// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Run summary: per-group, per-scenario outcomes.

use std::fmt::Write as _;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{exit_codes, ErrorKind, HarnessError};

/// File name of the JSON summary inside the test output directory
pub const SUMMARY_FILE: &str = "summary.json";

/// A classified failure, detached from the error that produced it
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub kind: ErrorKind,
    pub message: String,
    /// Unified-diff excerpt for result mismatches
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
}

impl From<&HarnessError> for Failure {
    fn from(err: &HarnessError) -> Self {
        let excerpt = match err {
            HarnessError::ResultMismatch { excerpt, .. } if !excerpt.is_empty() => {
                Some(excerpt.clone())
            }
            _ => None,
        };
        Self {
            kind: err.kind(),
            message: err.to_string(),
            excerpt,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScenarioOutcome {
    Passed {
        /// Observed value for report-only checks
        #[serde(default, skip_serializing_if = "Option::is_none")]
        detail: Option<String>,
    },
    Failed(Failure),
    Skipped {
        reason: String,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub name: String,
    #[serde(flatten)]
    pub outcome: ScenarioOutcome,
}

impl ScenarioReport {
    pub fn passed(name: impl Into<String>, detail: Option<String>) -> Self {
        Self {
            name: name.into(),
            outcome: ScenarioOutcome::Passed { detail },
        }
    }

    pub fn failed(name: impl Into<String>, err: &HarnessError) -> Self {
        Self {
            name: name.into(),
            outcome: ScenarioOutcome::Failed(Failure::from(err)),
        }
    }

    pub fn skipped(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            outcome: ScenarioOutcome::Skipped {
                reason: reason.into(),
            },
        }
    }
}

/// Outcome of one scenario group and its package lifecycle
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupReport {
    pub name: String,
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset: Option<String>,
    /// Purge, start, or compress failed, or the group panicked
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setup_error: Option<Failure>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teardown_error: Option<Failure>,
    pub scenarios: Vec<ScenarioReport>,
}

impl GroupReport {
    pub fn new(name: impl Into<String>, query: impl Into<String>, dataset: Option<String>) -> Self {
        Self {
            name: name.into(),
            query: query.into(),
            dataset,
            setup_error: None,
            teardown_error: None,
            scenarios: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.setup_error.is_none()
            && self.teardown_error.is_none()
            && self
                .scenarios
                .iter()
                .all(|s| matches!(s.outcome, ScenarioOutcome::Passed { .. }))
    }
}

/// Scenario totals across a run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Everything a `run` produced
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    pub groups: Vec<GroupReport>,
}

impl Default for RunSummary {
    fn default() -> Self {
        Self::new()
    }
}

impl RunSummary {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            finished_at: None,
            groups: Vec::new(),
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn totals(&self) -> Totals {
        let mut totals = Totals::default();
        for scenario in self.groups.iter().flat_map(|g| &g.scenarios) {
            match scenario.outcome {
                ScenarioOutcome::Passed { .. } => totals.passed += 1,
                ScenarioOutcome::Failed(_) => totals.failed += 1,
                ScenarioOutcome::Skipped { .. } => totals.skipped += 1,
            }
        }
        totals
    }

    pub fn is_success(&self) -> bool {
        self.groups.iter().all(GroupReport::is_success)
    }

    /// The most severe exit code over every group and scenario failure.
    /// A group that could not be set up or torn down is an infrastructure
    /// failure unless its cause was configuration.
    pub fn exit_code(&self) -> i32 {
        self.groups
            .iter()
            .flat_map(|g| {
                let lifecycle = [&g.setup_error, &g.teardown_error]
                    .into_iter()
                    .flatten()
                    .map(|f| match f.kind {
                        ErrorKind::Configuration => exit_codes::CONFIGURATION,
                        _ => exit_codes::INFRASTRUCTURE,
                    });
                let scenarios = g.scenarios.iter().filter_map(|s| match s.outcome {
                    ScenarioOutcome::Failed(ref f) => Some(f.kind.exit_code()),
                    _ => None,
                });
                lifecycle.chain(scenarios).collect::<Vec<_>>()
            })
            .max()
            .unwrap_or(exit_codes::SUCCESS)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write `summary.json` into `dir`.
    pub fn write_to(&self, dir: &Path) -> Result<(), HarnessError> {
        let path = dir.join(SUMMARY_FILE);
        let json = self
            .to_json()
            .map_err(|e| HarnessError::io(&path, std::io::Error::other(e)))?;
        std::fs::write(&path, json).map_err(|e| HarnessError::io(&path, e))
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "run {} started {}",
            self.run_id,
            self.started_at.to_rfc3339()
        );
        for group in &self.groups {
            let _ = write!(out, "group {} (query {:?}", group.name, group.query);
            if let Some(ref dataset) = group.dataset {
                let _ = write!(out, ", dataset {}", dataset);
            }
            let _ = writeln!(out, ")");
            if let Some(ref failure) = group.setup_error {
                let _ = writeln!(out, "  setup failed: {}", failure.message);
            }
            for scenario in &group.scenarios {
                match scenario.outcome {
                    ScenarioOutcome::Passed { detail: None } => {
                        let _ = writeln!(out, "  PASS {}", scenario.name);
                    }
                    ScenarioOutcome::Passed {
                        detail: Some(ref detail),
                    } => {
                        let _ = writeln!(out, "  PASS {} ({})", scenario.name, detail);
                    }
                    ScenarioOutcome::Failed(ref failure) => {
                        let _ = writeln!(out, "  FAIL {}: {}", scenario.name, failure.message);
                        for line in failure.excerpt.iter().flat_map(|e| e.lines()) {
                            let _ = writeln!(out, "       {}", line);
                        }
                    }
                    ScenarioOutcome::Skipped { ref reason } => {
                        let _ = writeln!(out, "  SKIP {}: {}", scenario.name, reason);
                    }
                }
            }
            if let Some(ref failure) = group.teardown_error {
                let _ = writeln!(out, "  teardown failed: {}", failure.message);
            }
        }
        let totals = self.totals();
        let _ = writeln!(
            out,
            "{} passed, {} failed, {} skipped",
            totals.passed, totals.failed, totals.skipped
        );
        out
    }
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
