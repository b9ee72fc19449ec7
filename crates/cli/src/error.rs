// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy for harness runs.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Exit codes for the `clp-harness` binary
pub mod exit_codes {
    /// Every scenario passed
    pub const SUCCESS: i32 = 0;
    /// At least one scenario failed
    pub const SCENARIO_FAILED: i32 = 1;
    /// Missing or invalid configuration; nothing was started
    pub const CONFIGURATION: i32 = 2;
    /// Package start/stop or supporting tooling failed
    pub const INFRASTRUCTURE: i32 = 3;
}

/// Coarse classification of a [`HarnessError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Environment or config file unusable
    Configuration,
    /// An external control script exited nonzero
    Command,
    /// Output did not match the oracle or expectation
    Assertion,
    /// A supporting tool (grep, diff) could not do its job
    Tooling,
    /// An external invocation exceeded its bound
    Timeout,
    /// Lifecycle or filesystem failure outside any assertion
    Infrastructure,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Configuration => "configuration",
            ErrorKind::Command => "command",
            ErrorKind::Assertion => "assertion",
            ErrorKind::Tooling => "tooling",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Infrastructure => "infrastructure",
        }
    }

    pub fn exit_code(self) -> i32 {
        match self {
            ErrorKind::Configuration => exit_codes::CONFIGURATION,
            ErrorKind::Command | ErrorKind::Assertion | ErrorKind::Timeout => {
                exit_codes::SCENARIO_FAILED
            }
            ErrorKind::Tooling | ErrorKind::Infrastructure => exit_codes::INFRASTRUCTURE,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("Environment variable {name} is not set")]
    MissingEnv { name: &'static str },

    #[error("Environment variable {name} is invalid ({value:?}): {reason}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Invalid configuration in {path}: {message}")]
    ConfigFile { path: PathBuf, message: String },

    #[error("Invalid scenario table: {0}")]
    ScenarioFile(String),

    #[error("Command failed (exit code {}): {command}", display_code(.exit_code))]
    CommandFailed {
        command: String,
        exit_code: Option<i32>,
        stderr: Option<String>,
    },

    #[error("Results differ: {} vs {}", .expected.display(), .actual.display())]
    ResultMismatch {
        expected: PathBuf,
        actual: PathBuf,
        /// Unified diff excerpt for the report
        excerpt: String,
    },

    #[error("Unexpected output from {command}: expected {expected:?}, got {actual:?}")]
    UnexpectedOutput {
        command: String,
        expected: String,
        actual: String,
    },

    #[error("{tool} failed: {message}")]
    ToolInvocation { tool: String, message: String },

    #[error("Command timed out after {timeout_ms}ms: {command}")]
    Timeout { command: String, timeout_ms: u64 },

    #[error("Failed to spawn {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Scenario group panicked: {0}")]
    BodyPanicked(String),

    #[error("Package teardown failed: {source}")]
    Teardown {
        #[source]
        source: Box<HarnessError>,
        /// Failure of the scenario group, when it also failed
        body_error: Option<Box<HarnessError>>,
    },
}

fn display_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "none, killed by signal".to_string(),
    }
}

impl HarnessError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        HarnessError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        HarnessError::ToolInvocation {
            tool: tool.into(),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            HarnessError::MissingEnv { .. }
            | HarnessError::InvalidEnv { .. }
            | HarnessError::ConfigFile { .. }
            | HarnessError::ScenarioFile(_) => ErrorKind::Configuration,
            HarnessError::CommandFailed { .. } => ErrorKind::Command,
            HarnessError::ResultMismatch { .. } | HarnessError::UnexpectedOutput { .. } => {
                ErrorKind::Assertion
            }
            HarnessError::ToolInvocation { .. } => ErrorKind::Tooling,
            HarnessError::Timeout { .. } => ErrorKind::Timeout,
            HarnessError::Spawn { .. }
            | HarnessError::Io { .. }
            | HarnessError::BodyPanicked(_)
            | HarnessError::Teardown { .. } => ErrorKind::Infrastructure,
        }
    }

    /// Fatal errors mean the environment is unusable: the rest of the group
    /// is skipped and nothing is retried.
    pub fn is_fatal(&self) -> bool {
        matches!(self.kind(), ErrorKind::Configuration | ErrorKind::Tooling)
    }

    /// Process exit code when this error ends a run.
    pub fn exit_code(&self) -> i32 {
        self.kind().exit_code()
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
