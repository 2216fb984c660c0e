//! Binary entry point for ardu-monitor.
//!
//! Logs go to stderr; stdout carries only command output.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use anyhow::Context as _;
use ardu_monitor::cli::output::{OutputFormat, format_error};
use ardu_monitor::cli::{Cli, execute};
use ardu_monitor::dispatch::StopSignal;
use clap::Parser;
use std::io;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

fn init_logging(level: Level) -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("failed to install logger")
}

fn install_stop_handler() -> anyhow::Result<StopSignal> {
    let stop = StopSignal::new();
    let handler_stop = stop.clone();
    ctrlc::set_handler(move || handler_stop.stop()).context("failed to install Ctrl-C handler")?;
    Ok(stop)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let format = OutputFormat::parse(&cli.format);

    if let Err(e) = init_logging(cli.log_level()) {
        eprintln!("Warning: {e:#}");
    }
    let stop = match install_stop_handler() {
        Ok(stop) => stop,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let result = execute(&cli, &stop, &mut io::stdout().lock());
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            let error_output = format_error(&e, format);
            match format {
                OutputFormat::Json => {
                    // JSON errors go to stdout for programmatic parsing
                    println!("{error_output}");
                }
                OutputFormat::Text => {
                    eprintln!("Error: {error_output}");
                }
            }
            ExitCode::FAILURE
        }
    }
}
