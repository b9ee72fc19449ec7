// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Line diffs between expected and actual output.

use serde::Serialize;
use similar::{ChangeTag, TextDiff};

/// Counts of lines that differ between two texts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DiffSummary {
    /// Lines present only in the expected text
    pub missing: usize,
    /// Lines present only in the actual text
    pub unexpected: usize,
}

impl DiffSummary {
    pub fn is_identical(&self) -> bool {
        self.missing == 0 && self.unexpected == 0
    }
}

/// Compare two texts line by line.
pub fn compare(expected: &str, actual: &str) -> DiffSummary {
    let diff = TextDiff::from_lines(expected, actual);
    let mut summary = DiffSummary::default();
    for change in diff.iter_all_changes() {
        match change.tag() {
            ChangeTag::Delete => summary.missing += 1,
            ChangeTag::Insert => summary.unexpected += 1,
            ChangeTag::Equal => {}
        }
    }
    summary
}

/// Render a unified diff, truncated to at most `max_lines` lines.
///
/// Returns an empty string when the texts are identical.
pub fn unified_diff(
    expected: &str,
    actual: &str,
    expected_name: &str,
    actual_name: &str,
    max_lines: usize,
) -> String {
    if expected == actual {
        return String::new();
    }
    let diff = TextDiff::from_lines(expected, actual);
    let rendered = diff
        .unified_diff()
        .context_radius(2)
        .header(expected_name, actual_name)
        .to_string();

    let total = rendered.lines().count();
    if total <= max_lines {
        return rendered;
    }

    let mut out: String = rendered
        .lines()
        .take(max_lines)
        .flat_map(|l| [l, "\n"])
        .collect();
    out.push_str(&format!("... ({} more lines)\n", total - max_lines));
    out
}

#[cfg(test)]
#[path = "diff_tests.rs"]
mod tests;
