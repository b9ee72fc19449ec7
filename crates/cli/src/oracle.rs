// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Reference results computed by an independent line scan, memoized by label.
//!
//! A scan over a large fixture corpus is expensive, so each
//! `(dataset, query)` pair is scanned once per session and the sorted result
//! file is reused by every scenario that needs it. The cache trusts its label
//! alone: a fixture changed between persisted sessions is not detected.

use std::collections::BTreeSet;
use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::{OracleConfig, ScannerKind};
use crate::error::HarnessError;
use crate::process::{ProcessRunner, RunOptions};

/// Index file holding persisted labels, inside the cache directory.
pub const INDEX_FILE: &str = "oracle-index.json";

/// Cache label for a dataset/query pair.
pub fn oracle_label(dataset: &str, query: &str) -> String {
    format!("grep-{}-{}", dataset, query)
}

/// File name for a label. Labels made only of `[A-Za-z0-9._-]` are used
/// as-is; anything else is replaced by `_` and a digest of the label is
/// appended so distinct labels never share a file.
pub fn label_file_name(label: &str) -> String {
    let is_safe = |c: char| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-');
    if !label.is_empty() && label.chars().all(is_safe) && !label.starts_with('.') {
        return label.to_string();
    }
    let sanitized: String = label
        .chars()
        .map(|c| if is_safe(c) { c } else { '_' })
        .collect();
    let digest = hex::encode(Sha256::digest(label.as_bytes()));
    format!("{}-{}", sanitized.trim_start_matches('.'), &digest[..12])
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct OracleIndex {
    labels: BTreeSet<String>,
}

/// Session-scoped memo of oracle result files
#[derive(Debug)]
pub struct OracleCache {
    dir: PathBuf,
    persist: bool,
    labels: Mutex<BTreeSet<String>>,
}

impl OracleCache {
    /// In-memory cache writing result files into `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            persist: false,
            labels: Mutex::new(BTreeSet::new()),
        }
    }

    /// Cache whose labels survive across sessions in `dir/oracle-index.json`.
    /// An unreadable index is ignored.
    pub fn persistent(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let index_path = dir.join(INDEX_FILE);
        let labels = match std::fs::read_to_string(&index_path) {
            Ok(content) => match serde_json::from_str::<OracleIndex>(&content) {
                Ok(index) => index.labels,
                Err(e) => {
                    warn!(path = %index_path.display(), error = %e, "ignoring unreadable oracle index");
                    BTreeSet::new()
                }
            },
            Err(_) => BTreeSet::new(),
        };
        Self {
            dir,
            persist: true,
            labels: Mutex::new(labels),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Deterministic result path for a label.
    pub fn result_path(&self, label: &str) -> PathBuf {
        self.dir.join(label_file_name(label))
    }

    /// Labels currently considered computed.
    pub async fn labels(&self) -> Vec<String> {
        self.labels.lock().await.iter().cloned().collect()
    }

    /// Return the result file for `label`, running `compute` only if the
    /// label has not been computed yet (or its file has disappeared).
    ///
    /// `compute` returns matching lines in any order, without terminators;
    /// they are sorted and written newline-terminated. Concurrent callers for
    /// any label are serialized, so `compute` runs at most once per label.
    pub async fn get_or_compute<F, Fut>(&self, label: &str, compute: F) -> Result<PathBuf, HarnessError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<String>, HarnessError>>,
    {
        let path = self.result_path(label);
        let mut labels = self.labels.lock().await;
        if labels.contains(label) && path.is_file() {
            debug!(label, "oracle cache hit");
            return Ok(path);
        }

        info!(label, "computing oracle result");
        let mut lines = compute().await?;
        lines.sort_unstable();
        self.write_atomically(&path, test_capture::render_lines(&lines).as_bytes())?;

        labels.insert(label.to_string());
        if self.persist {
            self.save_index(&labels)?;
        }
        Ok(path)
    }

    fn write_atomically(&self, path: &Path, content: &[u8]) -> Result<(), HarnessError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| HarnessError::io(&self.dir, e))?;
        let mut tmp =
            tempfile::NamedTempFile::new_in(&self.dir).map_err(|e| HarnessError::io(&self.dir, e))?;
        tmp.write_all(content)
            .map_err(|e| HarnessError::io(tmp.path(), e))?;
        tmp.persist(path)
            .map_err(|e| HarnessError::io(path, e.error))?;
        Ok(())
    }

    fn save_index(&self, labels: &BTreeSet<String>) -> Result<(), HarnessError> {
        let index = OracleIndex {
            labels: labels.clone(),
        };
        let path = self.dir.join(INDEX_FILE);
        let json = serde_json::to_string_pretty(&index)
            .map_err(|e| HarnessError::io(&path, std::io::Error::other(e)))?;
        self.write_atomically(&path, json.as_bytes())
    }
}

/// Independent line-matching scan over a fixture directory
#[derive(Clone, Debug)]
pub enum LineScanner {
    /// `grep --fixed-strings --recursive --no-filename -e <query> <dir>`
    Grep { program: PathBuf, timeout: Duration },
    /// In-process recursive literal substring scan
    Builtin,
}

impl LineScanner {
    pub fn from_config(config: &OracleConfig, timeout: Duration) -> Self {
        match config.scanner {
            ScannerKind::Grep => LineScanner::Grep {
                program: config.grep_program.clone(),
                timeout,
            },
            ScannerKind::Builtin => LineScanner::Builtin,
        }
    }

    /// Collect every line under `logs_dir` (recursively) that contains
    /// `query`. Order is unspecified.
    pub async fn scan(
        &self,
        runner: &ProcessRunner,
        logs_dir: &Path,
        query: &str,
    ) -> Result<Vec<String>, HarnessError> {
        match self {
            LineScanner::Grep { program, timeout } => {
                grep(runner, program, *timeout, logs_dir, query).await
            }
            LineScanner::Builtin => {
                let dir = logs_dir.to_path_buf();
                let query = query.to_string();
                tokio::task::spawn_blocking(move || scan_dir(&dir, &query))
                    .await
                    .map_err(|e| HarnessError::tool("builtin scan", e.to_string()))?
            }
        }
    }
}

async fn grep(
    runner: &ProcessRunner,
    program: &Path,
    timeout: Duration,
    logs_dir: &Path,
    query: &str,
) -> Result<Vec<String>, HarnessError> {
    let tool = program.display().to_string();
    let args = [
        "--fixed-strings".to_string(),
        "--recursive".to_string(),
        "--no-filename".to_string(),
        "-e".to_string(),
        query.to_string(),
        logs_dir.display().to_string(),
    ];
    let options = RunOptions::unchecked()
        .capture_stdout()
        .capture_stderr()
        .with_timeout(timeout);

    let outcome = match runner.run(program, args, &options).await {
        Ok(outcome) => outcome,
        Err(HarnessError::Spawn { source, .. }) => {
            return Err(HarnessError::tool(tool, source.to_string()))
        }
        Err(e) => return Err(e),
    };

    let stdout = outcome.stdout_text();
    let stderr = outcome.stderr_text();
    match outcome.exit_code {
        // 1 means no line matched.
        Some(0) | Some(1) => Ok(test_capture::split_lines(&stdout)
            .into_iter()
            .map(str::to_string)
            .collect()),
        code => Err(HarnessError::tool(
            tool,
            format!("exit code {:?}: {}", code, stderr.trim()),
        )),
    }
}

fn scan_dir(dir: &Path, query: &str) -> Result<Vec<String>, HarnessError> {
    let tool = "builtin scan";
    if !dir.is_dir() {
        return Err(HarnessError::tool(
            tool,
            format!("{}: not a directory", dir.display()),
        ));
    }

    let mut matches = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        let entries = std::fs::read_dir(&current)
            .map_err(|e| HarnessError::tool(tool, format!("{}: {}", current.display(), e)))?;
        for entry in entries {
            let entry =
                entry.map_err(|e| HarnessError::tool(tool, format!("{}: {}", current.display(), e)))?;
            let path = entry.path();
            let file_type = entry
                .file_type()
                .map_err(|e| HarnessError::tool(tool, format!("{}: {}", path.display(), e)))?;
            if file_type.is_dir() {
                pending.push(path);
            } else if file_type.is_file() {
                let bytes = std::fs::read(&path)
                    .map_err(|e| HarnessError::tool(tool, format!("{}: {}", path.display(), e)))?;
                let text = String::from_utf8_lossy(&bytes);
                matches.extend(
                    test_capture::split_lines(&text)
                        .into_iter()
                        .filter(|line| line.contains(query))
                        .map(str::to_string),
                );
            }
        }
    }
    Ok(matches)
}

#[cfg(test)]
#[path = "oracle_tests.rs"]
mod tests;
