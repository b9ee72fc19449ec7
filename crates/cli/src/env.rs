// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access.
//!
//! All environment variables read by the harness are defined here. Use these
//! accessors instead of calling `std::env::var()` directly.

/// Generated env var name constants.
mod names {
    include!(concat!(env!("OUT_DIR"), "/env_names.rs"));
}

// Re-export name constants for callers that need the raw name string.
pub use names::*;

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::HarnessError;

/// Required variables, in the order they are resolved.
pub const REQUIRED: [&str; 5] = [
    CLP_BINS_DIR,
    CLP_PACKAGE_DIR,
    CLP_PACKAGE_SBIN_DIR,
    TEST_OUTPUT_DIR,
    UNCOMPRESSED_LOGS_DIR,
];

/// Paths every harness session needs, resolved once from the environment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EnvironmentParameters {
    /// `CLP_BINS_DIR` — core binaries
    pub bins_dir: PathBuf,
    /// `CLP_PACKAGE_DIR` — package root holding `var/data` and `var/log`
    pub package_dir: PathBuf,
    /// `CLP_PACKAGE_SBIN_DIR` — control scripts
    pub package_sbin_dir: PathBuf,
    /// `TEST_OUTPUT_DIR` — oracle results, search results, run summary
    pub test_output_dir: PathBuf,
    /// `UNCOMPRESSED_LOGS_DIR` — one sub-directory per fixture dataset
    pub uncompressed_logs_dir: PathBuf,
}

impl EnvironmentParameters {
    /// Resolve from the process environment.
    pub fn resolve() -> Result<Self, HarnessError> {
        Self::resolve_with(|name| std::env::var(name).ok())
    }

    /// Resolve through an arbitrary lookup. Missing or empty values fail with
    /// a configuration error naming the first absent variable.
    pub fn resolve_with<F>(lookup: F) -> Result<Self, HarnessError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &'static str| -> Result<PathBuf, HarnessError> {
            match lookup(name) {
                Some(value) if !value.is_empty() => Ok(PathBuf::from(value)),
                _ => Err(HarnessError::MissingEnv { name }),
            }
        };

        Ok(Self {
            bins_dir: get(CLP_BINS_DIR)?,
            package_dir: get(CLP_PACKAGE_DIR)?,
            package_sbin_dir: get(CLP_PACKAGE_SBIN_DIR)?,
            test_output_dir: get(TEST_OUTPUT_DIR)?,
            uncompressed_logs_dir: get(UNCOMPRESSED_LOGS_DIR)?,
        })
    }

    /// `(variable, value)` pairs in resolution order.
    pub fn entries(&self) -> [(&'static str, &Path); 5] {
        [
            (CLP_BINS_DIR, self.bins_dir.as_path()),
            (CLP_PACKAGE_DIR, self.package_dir.as_path()),
            (CLP_PACKAGE_SBIN_DIR, self.package_sbin_dir.as_path()),
            (TEST_OUTPUT_DIR, self.test_output_dir.as_path()),
            (UNCOMPRESSED_LOGS_DIR, self.uncompressed_logs_dir.as_path()),
        ]
    }

    /// Fixture directory for a named dataset.
    pub fn logs_dir(&self, dataset_name: &str) -> PathBuf {
        self.uncompressed_logs_dir.join(dataset_name)
    }
}

/// `CLP_HARNESS_TIMEOUT_MS` — Override for every command bound.
///
/// Unset or empty is `None`; anything but a positive integer is an error.
pub fn timeout_ms() -> Result<Option<u64>, HarnessError> {
    var_positive_u64(names::CLP_HARNESS_TIMEOUT_MS)
}

fn var_positive_u64(name: &'static str) -> Result<Option<u64>, HarnessError> {
    let value = match std::env::var(name) {
        Ok(v) if !v.is_empty() => v,
        _ => return Ok(None),
    };
    let reason = match value.trim().parse::<u64>() {
        Ok(0) => "must be positive".to_string(),
        Ok(n) => return Ok(Some(n)),
        Err(e) => e.to_string(),
    };
    Err(HarnessError::InvalidEnv {
        name,
        value,
        reason,
    })
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
