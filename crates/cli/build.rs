// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Build scripts are expected to panic on failure.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::io::Write;

fn main() {
    let out_dir = std::env::var("OUT_DIR").unwrap();
    let path = std::path::Path::new(&out_dir).join("env_names.rs");
    let mut f = std::fs::File::create(path).unwrap();

    let vars = [
        ("CLP_BINS_DIR", "CLP_BINS_DIR"),
        ("CLP_PACKAGE_DIR", "CLP_PACKAGE_DIR"),
        ("CLP_PACKAGE_SBIN_DIR", "CLP_PACKAGE_SBIN_DIR"),
        ("TEST_OUTPUT_DIR", "TEST_OUTPUT_DIR"),
        ("UNCOMPRESSED_LOGS_DIR", "UNCOMPRESSED_LOGS_DIR"),
        ("CLP_HARNESS_CONFIG", "CLP_HARNESS_CONFIG"),
        ("CLP_HARNESS_SCENARIOS", "CLP_HARNESS_SCENARIOS"),
        ("CLP_HARNESS_TIMEOUT_MS", "CLP_HARNESS_TIMEOUT_MS"),
    ];

    for (const_name, env_name) in vars {
        writeln!(f, "pub const {const_name}: &str = \"{env_name}\";").unwrap();
    }
}
