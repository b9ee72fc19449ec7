// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Test capture CLI entry point.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;

/// Sort and compare captured command output
#[derive(Parser, Debug)]
#[command(name = "test-capture")]
#[command(about = "Normalize and compare captured CLI output")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sort the lines of a file
    Sort {
        /// File to sort
        input: PathBuf,

        /// Write the result here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Compare two files; exit 0 when identical, 1 when different, 2 on error
    Compare {
        expected: PathBuf,
        actual: PathBuf,

        /// Sort both sides before comparing
        #[arg(long)]
        sorted: bool,

        /// Print a JSON summary instead of a unified diff
        #[arg(long)]
        json: bool,

        /// Maximum diff lines to print
        #[arg(long, default_value_t = 40)]
        max_lines: usize,
    },
}

#[derive(Serialize)]
struct CompareReport<'a> {
    expected: &'a Path,
    actual: &'a Path,
    identical: bool,
    #[serde(flatten)]
    summary: test_capture::DiffSummary,
}

fn read(path: &Path) -> Result<String, String> {
    std::fs::read(path)
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .map_err(|e| format!("{}: {}", path.display(), e))
}

fn run(cli: Cli) -> Result<bool, String> {
    match cli.command {
        Command::Sort { input, output } => {
            let sorted = test_capture::normalize(&read(&input)?);
            match output {
                Some(path) => std::fs::write(&path, sorted)
                    .map_err(|e| format!("{}: {}", path.display(), e))?,
                None => print!("{}", sorted),
            }
            Ok(true)
        }
        Command::Compare {
            expected,
            actual,
            sorted,
            json,
            max_lines,
        } => {
            let mut left = read(&expected)?;
            let mut right = read(&actual)?;
            if sorted {
                left = test_capture::normalize(&left);
                right = test_capture::normalize(&right);
            }
            let summary = test_capture::compare(&left, &right);
            if json {
                let report = CompareReport {
                    expected: &expected,
                    actual: &actual,
                    identical: summary.is_identical(),
                    summary,
                };
                let text = serde_json::to_string_pretty(&report).map_err(|e| e.to_string())?;
                println!("{}", text);
            } else {
                print!(
                    "{}",
                    test_capture::unified_diff(
                        &left,
                        &right,
                        &expected.display().to_string(),
                        &actual.display().to_string(),
                        max_lines,
                    )
                );
            }
            Ok(summary.is_identical())
        }
    }
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("test-capture: {}", e);
            ExitCode::from(2)
        }
    }
}
