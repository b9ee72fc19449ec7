// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! External command execution with bounded waits.

use std::borrow::Cow;
use std::ffi::OsStr;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};

use clp_harness_capture::{CapturedCommand, CapturedOutcome, InvocationLog};
use tokio::process::Command;
use tracing::debug;

use crate::error::HarnessError;

/// Options for a single invocation
#[derive(Clone, Debug, Default)]
pub struct RunOptions {
    /// Capture stdout instead of inheriting it
    pub capture_stdout: bool,

    /// Capture stderr instead of inheriting it
    pub capture_stderr: bool,

    /// Working directory for the child
    pub working_directory: Option<PathBuf>,

    /// Fail with `CommandFailed` on a nonzero exit
    pub check: bool,

    /// Bound on the wait; `None` waits forever
    pub timeout: Option<Duration>,
}

impl RunOptions {
    /// Strict checking, nothing captured.
    pub fn checked() -> Self {
        Self {
            check: true,
            ..Self::default()
        }
    }

    /// No exit-code checking, nothing captured.
    pub fn unchecked() -> Self {
        Self::default()
    }

    pub fn capture_stdout(mut self) -> Self {
        self.capture_stdout = true;
        self
    }

    pub fn capture_stderr(mut self) -> Self {
        self.capture_stderr = true;
        self
    }

    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_directory = Some(dir.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Result of a finished invocation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessOutcome {
    /// `None` when terminated by a signal
    pub exit_code: Option<i32>,
    pub stdout: Option<Vec<u8>>,
    pub stderr: Option<Vec<u8>>,
}

impl ProcessOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Captured stdout as text; empty when stdout was not captured.
    pub fn stdout_text(&self) -> Cow<'_, str> {
        match &self.stdout {
            Some(bytes) => String::from_utf8_lossy(bytes),
            None => Cow::Borrowed(""),
        }
    }

    /// Captured stderr as text; empty when stderr was not captured.
    pub fn stderr_text(&self) -> Cow<'_, str> {
        match &self.stderr {
            Some(bytes) => String::from_utf8_lossy(bytes),
            None => Cow::Borrowed(""),
        }
    }
}

/// Runs external commands and records them in an optional invocation log
#[derive(Clone, Debug, Default)]
pub struct ProcessRunner {
    log: Option<InvocationLog>,
}

impl ProcessRunner {
    pub fn new() -> Self {
        Self { log: None }
    }

    pub fn with_log(log: InvocationLog) -> Self {
        Self { log: Some(log) }
    }

    pub fn log(&self) -> Option<&InvocationLog> {
        self.log.as_ref()
    }

    /// Run `program` with `args` and wait for it to exit.
    ///
    /// The child is killed if the wait exceeds `options.timeout`.
    pub async fn run<P, I, S>(
        &self,
        program: P,
        args: I,
        options: &RunOptions,
    ) -> Result<ProcessOutcome, HarnessError>
    where
        P: AsRef<OsStr>,
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let captured = CapturedCommand {
            program: program.as_ref().to_string_lossy().into_owned(),
            args: args
                .into_iter()
                .map(|a| a.as_ref().to_string_lossy().into_owned())
                .collect(),
            cwd: options
                .working_directory
                .as_ref()
                .map(|d| d.display().to_string()),
        };
        let command_line = captured.display();
        debug!(command = %command_line, "running");

        let mut cmd = Command::new(program.as_ref());
        cmd.args(&captured.args)
            .stdin(Stdio::null())
            .stdout(pipe_or_inherit(options.capture_stdout))
            .stderr(pipe_or_inherit(options.capture_stderr))
            .kill_on_drop(true);
        if let Some(ref dir) = options.working_directory {
            cmd.current_dir(dir);
        }

        let started = Instant::now();
        let child = match cmd.spawn() {
            Ok(child) => child,
            Err(source) => {
                self.record(
                    started,
                    captured,
                    CapturedOutcome::SpawnFailed {
                        message: source.to_string(),
                    },
                );
                return Err(HarnessError::Spawn {
                    command: command_line,
                    source,
                });
            }
        };

        let waited = match options.timeout {
            Some(limit) => match tokio::time::timeout(limit, child.wait_with_output()).await {
                Ok(result) => result,
                Err(_) => {
                    // Dropping the child handle kills it.
                    let timeout_ms = u64::try_from(limit.as_millis()).unwrap_or(u64::MAX);
                    self.record(started, captured, CapturedOutcome::TimedOut { timeout_ms });
                    return Err(HarnessError::Timeout {
                        command: command_line,
                        timeout_ms,
                    });
                }
            },
            None => child.wait_with_output().await,
        };
        let output = waited.map_err(|source| HarnessError::Spawn {
            command: command_line.clone(),
            source,
        })?;

        let exit_code = output.status.code();
        self.record(
            started,
            captured,
            CapturedOutcome::Exited {
                code: exit_code,
                duration: started.elapsed(),
            },
        );
        debug!(command = %command_line, ?exit_code, "finished");

        let outcome = ProcessOutcome {
            exit_code,
            stdout: options.capture_stdout.then_some(output.stdout),
            stderr: options.capture_stderr.then_some(output.stderr),
        };

        if options.check && !outcome.success() {
            return Err(HarnessError::CommandFailed {
                command: command_line,
                exit_code,
                stderr: outcome.stderr.as_ref().map(|_| outcome.stderr_text().into_owned()),
            });
        }
        Ok(outcome)
    }

    fn record(&self, started: Instant, command: CapturedCommand, outcome: CapturedOutcome) {
        if let Some(ref log) = self.log {
            log.record_launched(started, command, outcome);
        }
    }
}

fn pipe_or_inherit(capture: bool) -> Stdio {
    if capture {
        Stdio::piped()
    } else {
        Stdio::inherit()
    }
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
