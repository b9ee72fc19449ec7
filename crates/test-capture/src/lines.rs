// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Line splitting and sorting.

/// Split text into lines without their `\n` / `\r\n` terminators.
///
/// A trailing terminator does not produce an empty final line.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.lines().collect()
}

/// Split text into lines and sort them lexicographically (byte order).
pub fn sorted_lines(text: &str) -> Vec<&str> {
    let mut lines = split_lines(text);
    lines.sort_unstable();
    lines
}

/// Render lines back into text, each terminated by `\n`.
pub fn render_lines<S: AsRef<str>>(lines: &[S]) -> String {
    let capacity = lines.iter().map(|l| l.as_ref().len() + 1).sum();
    let mut out = String::with_capacity(capacity);
    for line in lines {
        out.push_str(line.as_ref());
        out.push('\n');
    }
    out
}

/// Sort the lines of `text` and render them newline-terminated.
pub fn normalize(text: &str) -> String {
    render_lines(&sorted_lines(text))
}

#[cfg(test)]
#[path = "lines_tests.rs"]
mod tests;
