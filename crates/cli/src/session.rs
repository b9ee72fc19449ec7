// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Session context shared by every scenario of a run.
//!
//! Built once from the resolved environment and harness config; cheap to
//! clone, so a group body can own a handle for the duration of its task.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clp_harness_capture::InvocationLog;
use parking_lot::Mutex;
use tracing::{error, info};

use crate::compare::Differ;
use crate::config::HarnessConfig;
use crate::control::ControlScripts;
use crate::env::EnvironmentParameters;
use crate::error::HarnessError;
use crate::oracle::{LineScanner, OracleCache};
use crate::package::{with_running_package, ScriptedPackage};
use crate::process::ProcessRunner;
use crate::report::{Failure, GroupReport, RunSummary, ScenarioReport};
use crate::runner;
use crate::scenario::{ScenarioGroup, TestCaseParameters};

/// Invocation log file inside the test output directory
pub const INVOCATIONS_FILE: &str = "invocations.jsonl";

#[derive(Clone, Debug)]
pub struct Session {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    env: EnvironmentParameters,
    config: HarnessConfig,
    package: ScriptedPackage,
    oracle: OracleCache,
    scanner: LineScanner,
    differ: Differ,
    runner: ProcessRunner,
}

impl Session {
    /// Create the output directory and wire every component to one runner
    /// and invocation log.
    pub fn new(env: EnvironmentParameters, config: HarnessConfig) -> Result<Self, HarnessError> {
        let output_dir = env.test_output_dir.clone();
        std::fs::create_dir_all(&output_dir).map_err(|e| HarnessError::io(&output_dir, e))?;

        let log_path = output_dir.join(INVOCATIONS_FILE);
        let log = InvocationLog::with_file(&log_path).map_err(|e| HarnessError::io(&log_path, e))?;
        let runner = ProcessRunner::with_log(log);

        let scripts = ControlScripts::new(
            &env.package_sbin_dir,
            runner.clone(),
            config.timeouts.clone(),
        );
        let package = ScriptedPackage::new(&env.package_dir, scripts);
        let oracle = if config.oracle.persist {
            OracleCache::persistent(&output_dir)
        } else {
            OracleCache::new(&output_dir)
        };
        let scanner = LineScanner::from_config(&config.oracle, config.timeouts.tool());
        let differ = Differ::new(runner.clone(), &config.compare, config.timeouts.tool());

        Ok(Self {
            inner: Arc::new(Inner {
                env,
                config,
                package,
                oracle,
                scanner,
                differ,
                runner,
            }),
        })
    }

    pub fn env(&self) -> &EnvironmentParameters {
        &self.inner.env
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.inner.config
    }

    pub fn output_dir(&self) -> &Path {
        &self.inner.env.test_output_dir
    }

    pub fn package(&self) -> &ScriptedPackage {
        &self.inner.package
    }

    pub fn scripts(&self) -> &ControlScripts {
        self.inner.package.scripts()
    }

    pub fn oracle(&self) -> &OracleCache {
        &self.inner.oracle
    }

    pub fn differ(&self) -> &Differ {
        &self.inner.differ
    }

    pub fn runner(&self) -> &ProcessRunner {
        &self.inner.runner
    }

    /// Every external command launched by this session.
    pub fn log(&self) -> Option<&InvocationLog> {
        self.inner.runner.log()
    }

    /// Sorted reference result for the group's untransformed query,
    /// computed on first use.
    pub async fn oracle_result(&self, params: &TestCaseParameters) -> Result<PathBuf, HarnessError> {
        let label = params.oracle_label();
        let inner = &self.inner;
        inner
            .oracle
            .get_or_compute(&label, || {
                inner
                    .scanner
                    .scan(&inner.runner, &params.logs_dir, &params.query)
            })
            .await
    }

    /// Run each group inside its own package lifecycle and write
    /// `summary.json`.
    pub async fn run(&self, groups: &[ScenarioGroup]) -> Result<RunSummary, HarnessError> {
        let mut summary = RunSummary::new();
        info!(run_id = %summary.run_id, groups = groups.len(), "starting run");
        for group in groups {
            let report = self.run_group(group).await;
            summary.groups.push(report);
        }
        summary.finish();
        summary.write_to(self.output_dir())?;
        info!(run_id = %summary.run_id, success = summary.is_success(), "run finished");
        Ok(summary)
    }

    /// Start a clean package, run the group, and always stop and purge.
    pub async fn run_group(&self, group: &ScenarioGroup) -> GroupReport {
        let report = Arc::new(Mutex::new(GroupReport::new(
            &group.name,
            &group.query,
            group.dataset.clone(),
        )));

        let result = with_running_package(self.package(), || {
            let session = self.clone();
            let group = group.clone();
            let report = Arc::clone(&report);
            async move { runner::run_group(&session, &group, &report).await }
        })
        .await;

        let mut report = report.lock().clone();
        match result {
            Ok(()) => {}
            Err(HarnessError::Teardown { source, body_error }) => {
                if let Some(body_error) = body_error {
                    report.setup_error = Some(Failure::from(&*body_error));
                }
                let teardown = HarnessError::Teardown {
                    source,
                    body_error: None,
                };
                error!(group = %group.name, error = %teardown, "package teardown failed");
                report.teardown_error = Some(Failure::from(&teardown));
            }
            Err(e) => {
                error!(group = %group.name, error = %e, "scenario group aborted");
                report.setup_error = Some(Failure::from(&e));
            }
        }

        if let Some(ref failure) = report.setup_error {
            let reason = format!("not run after {} error: {}", failure.kind, failure.message);
            let reported = report.scenarios.len();
            let skipped: Vec<ScenarioReport> = group
                .scenarios()
                .into_iter()
                .skip(reported)
                .map(|scenario| ScenarioReport::skipped(scenario.name(), reason.clone()))
                .collect();
            report.scenarios.extend(skipped);
        }
        report
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
