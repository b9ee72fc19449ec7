// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Client for the package's control scripts.
//!
//! The package is a black box driven through four scripts in its `sbin`
//! directory: start, stop, compress, and search.

use std::path::{Path, PathBuf};

use crate::config::Timeouts;
use crate::error::HarnessError;
use crate::process::{ProcessOutcome, ProcessRunner, RunOptions};

pub const START_SCRIPT: &str = "start-clp.sh";
pub const STOP_SCRIPT: &str = "stop-clp.sh";
pub const COMPRESS_SCRIPT: &str = "compress.sh";
pub const SEARCH_SCRIPT: &str = "search.sh";

/// Arguments for the compress script
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompressRequest {
    pub logs_dir: PathBuf,
    pub dataset: Option<String>,
}

impl CompressRequest {
    pub fn new(logs_dir: impl Into<PathBuf>) -> Self {
        Self {
            logs_dir: logs_dir.into(),
            dataset: None,
        }
    }

    pub fn with_dataset(mut self, dataset: Option<String>) -> Self {
        self.dataset = dataset;
        self
    }

    /// `[--dataset <name>] <logs_directory>`
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(ref dataset) = self.dataset {
            args.push("--dataset".to_string());
            args.push(dataset.clone());
        }
        args.push(self.logs_dir.display().to_string());
        args
    }
}

/// What a search reports
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SearchTarget {
    /// Matching lines from every archive
    #[default]
    All,
    /// Matching lines from one original file
    FilePath(PathBuf),
    /// Number of matches
    Count,
    /// Number of matches per time bucket of the given width
    CountByTimeBucket(u64),
}

/// Arguments for the search script
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    pub raw: bool,
    pub ignore_case: bool,
    pub dataset: Option<String>,
    pub target: SearchTarget,
}

impl SearchRequest {
    /// Raw-output search over every archive.
    pub fn raw(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            raw: true,
            ignore_case: false,
            dataset: None,
            target: SearchTarget::All,
        }
    }

    pub fn ignore_case(mut self, ignore_case: bool) -> Self {
        self.ignore_case = ignore_case;
        self
    }

    pub fn with_dataset(mut self, dataset: Option<String>) -> Self {
        self.dataset = dataset;
        self
    }

    pub fn with_target(mut self, target: SearchTarget) -> Self {
        self.target = target;
        self
    }

    /// `--raw [--ignore-case] [--dataset <name>] [--file-path <path> | --count |
    /// --count-by-time-bucket <ms>] <query>`
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if self.raw {
            args.push("--raw".to_string());
        }
        if self.ignore_case {
            args.push("--ignore-case".to_string());
        }
        if let Some(ref dataset) = self.dataset {
            args.push("--dataset".to_string());
            args.push(dataset.clone());
        }
        match &self.target {
            SearchTarget::All => {}
            SearchTarget::FilePath(path) => {
                args.push("--file-path".to_string());
                args.push(path.display().to_string());
            }
            SearchTarget::Count => args.push("--count".to_string()),
            SearchTarget::CountByTimeBucket(ms) => {
                args.push("--count-by-time-bucket".to_string());
                args.push(ms.to_string());
            }
        }
        args.push(self.query.clone());
        args
    }
}

/// Runs the control scripts in a package `sbin` directory
#[derive(Clone, Debug)]
pub struct ControlScripts {
    sbin_dir: PathBuf,
    runner: ProcessRunner,
    timeouts: Timeouts,
}

impl ControlScripts {
    pub fn new(sbin_dir: impl Into<PathBuf>, runner: ProcessRunner, timeouts: Timeouts) -> Self {
        Self {
            sbin_dir: sbin_dir.into(),
            runner,
            timeouts,
        }
    }

    pub fn sbin_dir(&self) -> &Path {
        &self.sbin_dir
    }

    pub fn script(&self, name: &str) -> PathBuf {
        self.sbin_dir.join(name)
    }

    pub async fn start(&self) -> Result<(), HarnessError> {
        let options = RunOptions::checked().with_timeout(self.timeouts.start());
        self.runner
            .run(self.script(START_SCRIPT), Vec::<String>::new(), &options)
            .await
            .map(|_| ())
    }

    pub async fn stop(&self) -> Result<(), HarnessError> {
        let options = RunOptions::checked().with_timeout(self.timeouts.stop());
        self.runner
            .run(self.script(STOP_SCRIPT), Vec::<String>::new(), &options)
            .await
            .map(|_| ())
    }

    /// Compress a fixture directory. Output is captured to keep the harness
    /// log readable.
    pub async fn compress(&self, request: &CompressRequest) -> Result<(), HarnessError> {
        let options = RunOptions::checked()
            .capture_stdout()
            .with_timeout(self.timeouts.compress());
        self.runner
            .run(self.script(COMPRESS_SCRIPT), request.to_args(), &options)
            .await
            .map(|_| ())
    }

    /// Search with strict checking; stdout is always captured.
    pub async fn search(&self, request: &SearchRequest) -> Result<ProcessOutcome, HarnessError> {
        let options = RunOptions::checked()
            .capture_stdout()
            .with_timeout(self.timeouts.search());
        self.runner
            .run(self.script(SEARCH_SCRIPT), request.to_args(), &options)
            .await
    }
}

#[cfg(test)]
#[path = "control_tests.rs"]
mod tests;
