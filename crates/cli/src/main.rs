// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! CLP harness binary entry point.

use clap::Parser;
use serde::Serialize;

use clp_harness::cli::{Cli, Command, OracleArgs, OutputFormat, RunArgs};
use clp_harness::env::EnvironmentParameters;
use clp_harness::error::{exit_codes, HarnessError};
use clp_harness::output::{init_logging, print_error, print_warning};
use clp_harness::package::purge_package_data;
use clp_harness::scenario::{ScenarioTable, TestCaseParameters};
use clp_harness::session::Session;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let code = match dispatch(cli.command).await {
        Ok(code) => code,
        Err(e) => {
            print_error(&e);
            if let HarnessError::CommandFailed {
                stderr: Some(ref stderr),
                ..
            } = e
            {
                eprintln!("{}", stderr.trim_end());
            }
            e.exit_code()
        }
    };
    std::process::exit(code);
}

async fn dispatch(command: Command) -> Result<i32, HarnessError> {
    match command {
        Command::Run(args) => run(args).await,
        Command::Env { format } => print_env(format),
        Command::Oracle(args) => oracle(args).await,
        Command::Purge => {
            let env = EnvironmentParameters::resolve()?;
            purge_package_data(&env.package_dir)?;
            Ok(exit_codes::SUCCESS)
        }
    }
}

async fn run(args: RunArgs) -> Result<i32, HarnessError> {
    // Resolve everything before touching the package.
    let env = EnvironmentParameters::resolve()?;
    let config = args.harness.load_config()?;
    let table = match args.scenarios {
        Some(ref path) => ScenarioTable::load(path)?,
        None => ScenarioTable::builtin(),
    };
    let groups = table.select(&args.groups)?;

    let session = Session::new(env, config)?;
    let summary = session.run(&groups).await?;

    match args.format {
        OutputFormat::Text => print!("{}", summary.render_text()),
        OutputFormat::Json => println!("{}", to_json(&summary)?),
    }
    let totals = summary.totals();
    if totals.failed > 0 {
        print_warning(format_args!(
            "{} of {} scenarios failed",
            totals.failed,
            totals.passed + totals.failed + totals.skipped
        ));
    }
    Ok(summary.exit_code())
}

fn print_env(format: OutputFormat) -> Result<i32, HarnessError> {
    let env = EnvironmentParameters::resolve()?;
    match format {
        OutputFormat::Text => {
            for (name, value) in env.entries() {
                println!("{}={}", name, value.display());
            }
        }
        OutputFormat::Json => println!("{}", to_json(&env)?),
    }
    Ok(exit_codes::SUCCESS)
}

async fn oracle(args: OracleArgs) -> Result<i32, HarnessError> {
    let env = EnvironmentParameters::resolve()?;
    let config = args.harness.load_config()?;
    let params = TestCaseParameters {
        logs_dir: env.logs_dir(&args.name),
        name: args.name,
        query: args.query,
        dataset: None,
    };
    let session = Session::new(env, config)?;
    let path = session.oracle_result(&params).await?;
    println!("{}", path.display());
    Ok(exit_codes::SUCCESS)
}

fn to_json<T: Serialize>(value: &T) -> Result<String, HarnessError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| HarnessError::io("<stdout>", std::io::Error::other(e)))
}
