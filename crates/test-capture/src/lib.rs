// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Output normalization and comparison utilities for clp-harness.
//!
//! Search engines and oracles emit matching lines in unrelated orders, so
//! every comparison goes through the same normalization: split into lines,
//! drop terminators, sort, re-render newline-terminated.

mod diff;
mod lines;

pub use diff::{compare, unified_diff, DiffSummary};
pub use lines::{normalize, render_lines, sorted_lines, split_lines};
