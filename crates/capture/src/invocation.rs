// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Captured invocation data types.

use super::duration_serde;
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime};

/// Captured invocation record
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CapturedInvocation {
    /// Sequence number
    pub seq: u64,

    /// Wall-clock time the command was launched
    pub timestamp: SystemTime,

    /// Time from log creation to launch
    #[serde(with = "duration_serde")]
    pub elapsed: Duration,

    /// Command that was launched
    pub command: CapturedCommand,

    /// How the command ended
    pub outcome: CapturedOutcome,
}

/// Captured command line
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedCommand {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<String>,
}

impl CapturedCommand {
    /// Render as a single shell-like line for log messages.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Captured outcome of one invocation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CapturedOutcome {
    Exited {
        /// `None` when the process was terminated by a signal.
        code: Option<i32>,
        #[serde(with = "duration_serde")]
        duration: Duration,
    },
    TimedOut {
        timeout_ms: u64,
    },
    SpawnFailed {
        message: String,
    },
}

impl CapturedOutcome {
    /// True only for a zero exit status.
    pub fn is_success(&self) -> bool {
        matches!(self, CapturedOutcome::Exited { code: Some(0), .. })
    }
}

#[cfg(test)]
#[path = "invocation_tests.rs"]
mod tests;
