// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Invocation log implementation.

use crate::invocation::{CapturedCommand, CapturedInvocation, CapturedOutcome};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::BufWriter;
use std::path::Path;
use std::sync::Arc;
use std::time::{Instant, SystemTime};

/// Log of external command invocations
pub struct InvocationLog {
    start: Instant,
    invocations: Arc<Mutex<Vec<CapturedInvocation>>>,
    file_writer: Option<Arc<Mutex<BufWriter<File>>>>,
}

impl InvocationLog {
    /// Create a new in-memory invocation log
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            invocations: Arc::new(Mutex::new(Vec::new())),
            file_writer: None,
        }
    }

    /// Create an invocation log that appends to a file (JSONL format)
    pub fn with_file(path: &Path) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            start: Instant::now(),
            invocations: Arc::new(Mutex::new(Vec::new())),
            file_writer: Some(Arc::new(Mutex::new(BufWriter::new(file)))),
        })
    }

    /// Record an invocation
    pub fn record(&self, command: CapturedCommand, outcome: CapturedOutcome) {
        self.record_launched(Instant::now(), command, outcome);
    }

    /// Record an invocation that was launched at `launched` and has since
    /// finished.
    pub fn record_launched(
        &self,
        launched: Instant,
        command: CapturedCommand,
        outcome: CapturedOutcome,
    ) {
        let now = SystemTime::now();
        let timestamp = now.checked_sub(launched.elapsed()).unwrap_or(now);
        let mut invocations = self.invocations.lock();
        let seq = invocations.len() as u64;
        let invocation = CapturedInvocation {
            seq,
            timestamp,
            elapsed: launched.saturating_duration_since(self.start),
            command,
            outcome,
        };

        invocations.push(invocation.clone());

        if let Some(ref writer) = self.file_writer {
            use std::io::Write;
            let mut w = writer.lock();
            if let Ok(json) = serde_json::to_string(&invocation) {
                let _ = writeln!(w, "{}", json);
                let _ = w.flush();
            }
        }
    }

    /// Get all captured invocations
    pub fn invocations(&self) -> Vec<CapturedInvocation> {
        self.invocations.lock().clone()
    }

    /// Get the last N invocations
    pub fn last(&self, n: usize) -> Vec<CapturedInvocation> {
        let all = self.invocations.lock();
        all.iter().rev().take(n).rev().cloned().collect()
    }

    /// Count invocations matching a predicate
    pub fn count<F: Fn(&CapturedInvocation) -> bool>(&self, pred: F) -> usize {
        self.invocations.lock().iter().filter(|i| pred(i)).count()
    }

    /// Find invocations whose program path ends with `name`
    pub fn find_by_program(&self, name: &str) -> Vec<CapturedInvocation> {
        self.invocations
            .lock()
            .iter()
            .filter(|i| i.command.program.ends_with(name))
            .cloned()
            .collect()
    }

    /// Find invocations that did not exit successfully
    pub fn find_failures(&self) -> Vec<CapturedInvocation> {
        self.invocations
            .lock()
            .iter()
            .filter(|i| !i.outcome.is_success())
            .cloned()
            .collect()
    }

    /// Get the total number of invocations
    pub fn len(&self) -> usize {
        self.invocations.lock().len()
    }

    /// Check if the log is empty
    pub fn is_empty(&self) -> bool {
        self.invocations.lock().is_empty()
    }

    /// Clear all recorded invocations
    pub fn clear(&self) {
        self.invocations.lock().clear();
    }
}

impl Default for InvocationLog {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for InvocationLog {
    fn clone(&self) -> Self {
        Self {
            start: self.start,
            invocations: Arc::clone(&self.invocations),
            file_writer: self.file_writer.as_ref().map(Arc::clone),
        }
    }
}

impl std::fmt::Debug for InvocationLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvocationLog")
            .field("len", &self.len())
            .field("file_backed", &self.file_writer.is_some())
            .finish()
    }
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
