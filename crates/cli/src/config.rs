// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Harness configuration loaded from an optional TOML file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::HarnessError;

/// Default bound for start/stop/search/tool invocations (10 minutes)
pub const DEFAULT_COMMAND_TIMEOUT_MS: u64 = 600_000;
/// Default bound for compression (1 hour)
pub const DEFAULT_COMPRESS_TIMEOUT_MS: u64 = 3_600_000;
/// Default number of unified-diff lines attached to a mismatch
pub const DEFAULT_EXCERPT_LINES: usize = 40;

fn default_command_timeout() -> u64 {
    DEFAULT_COMMAND_TIMEOUT_MS
}

fn default_compress_timeout() -> u64 {
    DEFAULT_COMPRESS_TIMEOUT_MS
}

fn default_grep_program() -> PathBuf {
    PathBuf::from("grep")
}

fn default_diff_program() -> PathBuf {
    PathBuf::from("diff")
}

fn default_excerpt_lines() -> usize {
    DEFAULT_EXCERPT_LINES
}

/// Top-level harness configuration
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct HarnessConfig {
    #[serde(default)]
    pub timeouts: Timeouts,

    #[serde(default)]
    pub oracle: OracleConfig,

    #[serde(default)]
    pub compare: CompareConfig,
}

/// Bounds on external invocations, in milliseconds
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Timeouts {
    #[serde(default = "default_command_timeout")]
    pub start_ms: u64,
    #[serde(default = "default_command_timeout")]
    pub stop_ms: u64,
    #[serde(default = "default_compress_timeout")]
    pub compress_ms: u64,
    #[serde(default = "default_command_timeout")]
    pub search_ms: u64,
    /// grep and diff
    #[serde(default = "default_command_timeout")]
    pub tool_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            start_ms: DEFAULT_COMMAND_TIMEOUT_MS,
            stop_ms: DEFAULT_COMMAND_TIMEOUT_MS,
            compress_ms: DEFAULT_COMPRESS_TIMEOUT_MS,
            search_ms: DEFAULT_COMMAND_TIMEOUT_MS,
            tool_ms: DEFAULT_COMMAND_TIMEOUT_MS,
        }
    }
}

impl Timeouts {
    /// Every bound set to the same value.
    pub fn uniform(ms: u64) -> Self {
        Self {
            start_ms: ms,
            stop_ms: ms,
            compress_ms: ms,
            search_ms: ms,
            tool_ms: ms,
        }
    }

    pub fn start(&self) -> Duration {
        Duration::from_millis(self.start_ms)
    }

    pub fn stop(&self) -> Duration {
        Duration::from_millis(self.stop_ms)
    }

    pub fn compress(&self) -> Duration {
        Duration::from_millis(self.compress_ms)
    }

    pub fn search(&self) -> Duration {
        Duration::from_millis(self.search_ms)
    }

    pub fn tool(&self) -> Duration {
        Duration::from_millis(self.tool_ms)
    }
}

/// How reference results are computed
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ScannerKind {
    /// External `grep --recursive --no-filename`
    #[default]
    Grep,
    /// In-process recursive literal substring scan
    Builtin,
}

/// Oracle configuration
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct OracleConfig {
    #[serde(default)]
    pub scanner: ScannerKind,

    #[serde(default = "default_grep_program")]
    pub grep_program: PathBuf,

    /// Keep the label index across sessions
    #[serde(default)]
    pub persist: bool,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            scanner: ScannerKind::default(),
            grep_program: default_grep_program(),
            persist: false,
        }
    }
}

/// Comparison configuration
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CompareConfig {
    #[serde(default = "default_diff_program")]
    pub diff_program: PathBuf,

    #[serde(default = "default_excerpt_lines")]
    pub excerpt_lines: usize,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            diff_program: default_diff_program(),
            excerpt_lines: DEFAULT_EXCERPT_LINES,
        }
    }
}

impl HarnessConfig {
    /// Load from a TOML file
    pub fn load(path: &Path) -> Result<Self, HarnessError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| HarnessError::ConfigFile {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        Self::parse(&content).map_err(|message| HarnessError::ConfigFile {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Parse TOML content
    pub fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
