// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Command-line interface.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::config::{HarnessConfig, ScannerKind, Timeouts};
use crate::env;
use crate::error::HarnessError;

/// Comparison test harness for the CLP package
#[derive(Parser, Debug)]
#[command(name = "clp-harness", version, about = "CLP package comparison test harness")]
pub struct Cli {
    /// More log output (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run scenario groups against the package
    Run(RunArgs),

    /// Print the resolved environment
    Env {
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Compute (or reuse) the oracle result for a dataset and query
    Oracle(OracleArgs),

    /// Remove the package's data and log directories
    Purge,
}

/// Options shared by commands that build a session
#[derive(Args, Debug, Clone, Default)]
pub struct HarnessArgs {
    /// Harness configuration file (TOML)
    #[arg(long, env = env::CLP_HARNESS_CONFIG)]
    pub config: Option<PathBuf>,

    /// Bound every external command to this many milliseconds
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_ms: Option<u64>,

    /// Oracle scanner, overriding the config file
    #[arg(long = "oracle", value_enum)]
    pub scanner: Option<ScannerKind>,
}

impl HarnessArgs {
    /// Load the config file (or defaults) and apply command-line overrides.
    /// A `--timeout-ms` flag wins over `CLP_HARNESS_TIMEOUT_MS`.
    pub fn load_config(&self) -> Result<HarnessConfig, HarnessError> {
        let mut config = match self.config {
            Some(ref path) => HarnessConfig::load(path)?,
            None => HarnessConfig::default(),
        };
        let timeout_ms = match self.timeout_ms {
            Some(ms) => Some(ms),
            None => env::timeout_ms()?,
        };
        if let Some(ms) = timeout_ms {
            config.timeouts = Timeouts::uniform(ms);
        }
        if let Some(scanner) = self.scanner {
            config.oracle.scanner = scanner;
        }
        Ok(config)
    }
}

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub harness: HarnessArgs,

    /// Scenario table (TOML or JSON); the built-in table when absent
    #[arg(long, env = env::CLP_HARNESS_SCENARIOS)]
    pub scenarios: Option<PathBuf>,

    /// Run only the named group (repeatable)
    #[arg(long = "group", value_name = "NAME")]
    pub groups: Vec<String>,

    /// Summary format on stdout
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Args, Debug)]
pub struct OracleArgs {
    #[command(flatten)]
    pub harness: HarnessArgs,

    /// Fixture dataset directory name
    #[arg(long)]
    pub name: String,

    /// Literal query
    #[arg(long)]
    pub query: String,
}

/// Output format for reports
#[derive(Clone, Copy, Debug, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
