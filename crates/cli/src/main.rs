// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Fleetguard CLI entry point.

use clap::{CommandFactory, Parser};
use tracing_subscriber::{EnvFilter, fmt};

use fleetguard::cli::{Cli, Command};
use fleetguard::error::ExitCode;

mod cmd_report;
mod cmd_rules;
mod cmd_run;

fn init_logging() {
    let filter =
        EnvFilter::try_from_env("FLEETGUARD_LOG").unwrap_or_else(|_| EnvFilter::new("off"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_logging();

    let exit_code = match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("fleetguard: {}", e);
            match e.downcast_ref::<fleetguard::Error>() {
                Some(err) => ExitCode::from(err),
                None => ExitCode::InternalError,
            }
        }
    };

    std::process::exit(exit_code as i32);
}

fn run() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    match &cli.command {
        None => {
            // Show help for bare invocation
            Cli::command().print_help()?;
            println!();
            Ok(ExitCode::Success)
        }
        Some(Command::Audit(args)) => cmd_run::audit(&cli, args),
        Some(Command::Fix(args)) => cmd_run::fix(&cli, args),
        Some(Command::Maintain(args)) => cmd_run::maintain(&cli, args),
        Some(Command::Report(args)) => cmd_report::run(&cli, args),
        Some(Command::Rules(args)) => cmd_rules::run(&cli, args),
    }
}
