// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Fixture-driven comparison testing for the CLP package.
//!
//! Starts the package from a clean state, compresses fixture datasets,
//! runs searches through the package's control scripts, and compares the
//! results against an independent line scan. The package is always stopped
//! and purged afterwards.

pub mod cli;
pub mod compare;
pub mod config;
pub mod control;
pub mod env;
pub mod error;
pub mod oracle;
pub mod output;
pub mod package;
pub mod process;
pub mod report;
pub mod runner;
pub mod scenario;
pub mod session;

pub use error::HarnessError;
