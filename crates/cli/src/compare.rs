// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Normalized comparison of search output against reference results.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::CompareConfig;
use crate::error::HarnessError;
use crate::process::{ProcessOutcome, ProcessRunner, RunOptions};

/// Sort the lines of `stdout` and write them newline-terminated to `path`.
pub fn write_sorted_output(path: &Path, stdout: &str) -> Result<(), HarnessError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| HarnessError::io(parent, e))?;
    }
    std::fs::write(path, test_capture::normalize(stdout)).map_err(|e| HarnessError::io(path, e))
}

/// Classify a finished `diff` run: 0 identical, 1 content differs, anything
/// else means diff itself failed.
pub fn classify_diff(
    outcome: &ProcessOutcome,
    expected: &Path,
    actual: &Path,
) -> Result<(), HarnessError> {
    match outcome.exit_code {
        Some(0) => Ok(()),
        Some(1) => Err(HarnessError::ResultMismatch {
            expected: expected.to_path_buf(),
            actual: actual.to_path_buf(),
            excerpt: String::new(),
        }),
        code => Err(HarnessError::tool(
            "diff",
            format!(
                "exit code {:?} comparing {} and {}: {}",
                code,
                expected.display(),
                actual.display(),
                outcome.stderr_text().trim()
            ),
        )),
    }
}

/// Runs the external diff tool over result files
#[derive(Clone, Debug)]
pub struct Differ {
    runner: ProcessRunner,
    program: PathBuf,
    timeout: Duration,
    excerpt_lines: usize,
}

impl Differ {
    pub fn new(runner: ProcessRunner, config: &CompareConfig, timeout: Duration) -> Self {
        Self {
            runner,
            program: config.diff_program.clone(),
            timeout,
            excerpt_lines: config.excerpt_lines,
        }
    }

    /// `diff --brief expected actual`. A mismatch carries a unified-diff
    /// excerpt of both files.
    pub async fn diff_files(&self, expected: &Path, actual: &Path) -> Result<(), HarnessError> {
        let options = RunOptions::unchecked()
            .capture_stdout()
            .capture_stderr()
            .with_timeout(self.timeout);
        let args = [
            "--brief".to_string(),
            expected.display().to_string(),
            actual.display().to_string(),
        ];
        let outcome = match self.runner.run(&self.program, args, &options).await {
            Ok(outcome) => outcome,
            Err(HarnessError::Spawn { source, .. }) => {
                return Err(HarnessError::tool(
                    self.program.display().to_string(),
                    source.to_string(),
                ))
            }
            Err(e) => return Err(e),
        };

        match classify_diff(&outcome, expected, actual) {
            Err(HarnessError::ResultMismatch {
                expected, actual, ..
            }) => {
                let excerpt = self.excerpt(&expected, &actual);
                Err(HarnessError::ResultMismatch {
                    expected,
                    actual,
                    excerpt,
                })
            }
            other => other,
        }
    }

    fn excerpt(&self, expected: &Path, actual: &Path) -> String {
        let read = |p: &Path| {
            std::fs::read(p)
                .map(|b| String::from_utf8_lossy(&b).into_owned())
                .unwrap_or_default()
        };
        test_capture::unified_diff(
            &read(expected),
            &read(actual),
            &expected.display().to_string(),
            &actual.display().to_string(),
            self.excerpt_lines,
        )
    }
}

#[cfg(test)]
#[path = "compare_tests.rs"]
mod tests;
