//! espscope - ESP firmware image inspector
//!
//! Prints a JSON description of a firmware file: chip family, flash
//! configuration from the image header, and the partition table when the
//! file is a full flash dump.
//!
//! stdout carries only JSON. Diagnostics go to stderr through `env_logger`
//! and are off below warning level unless `-v` is given.

mod cli;
mod error;

use clap::error::ErrorKind;
use clap::Parser;
use cli::Cli;
use error::{CliError, Result};
use espscope_core::{analyze_file, Report};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => return fail(&CliError::Args(e)),
    };

    // Initialize logger, -v overrides RUST_LOG
    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    match cli.verbose {
        0 => {}
        1 => {
            logger.filter_level(log::LevelFilter::Debug);
        }
        _ => {
            logger.filter_level(log::LevelFilter::Trace);
        }
    }
    logger.init();

    match run(&cli) {
        Ok(code) => code,
        Err(e) => fail(&e),
    }
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let path = cli.file.as_deref().ok_or(CliError::Usage)?;

    let report = analyze_file(path);
    let code = if report.is_failure() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    };

    println!("{}", render(&report)?);
    Ok(code)
}

fn render(report: &Report) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Print a fatal error as JSON and return the failure exit code
fn fail(e: &CliError) -> ExitCode {
    log::debug!("fatal: {:?}", e);
    let report = Report::failed(e.to_string());
    match render(&report) {
        Ok(json) => println!("{}", json),
        Err(err) => eprintln!("{}", err),
    }
    ExitCode::FAILURE
}
