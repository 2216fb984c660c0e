//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros.

use crate::config::{DEFAULT_BAUD_RATE, DEFAULT_QUEUE_CAPACITY};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;

/// ardu-monitor: watch the JSON event stream of a serial-attached board.
///
/// Reads newline-delimited JSON events from a serial port (or a captured
/// log) and prints them as they arrive.
#[derive(Parser, Debug)]
#[command(name = "ardu-monitor")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output (debug logging).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log level on stderr (trace, debug, info, warn, error).
    #[arg(long, default_value = "warn", global = true)]
    pub log_level: String,

    /// Output format (text, json).
    #[arg(long, default_value = "text", global = true)]
    pub format: String,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Stream events from a serial port until interrupted.
    Monitor {
        /// Serial port, e.g. `/dev/ttyACM0` or `COM3`.
        #[arg(short, long, env = "ARDU_PORT")]
        port: String,

        /// Baud rate.
        #[arg(short, long, env = "ARDU_BAUD", default_value_t = DEFAULT_BAUD_RATE)]
        baud: u32,

        /// Read timeout per poll in milliseconds.
        #[arg(long, default_value = "200")]
        timeout_ms: u64,

        /// Report lines longer than this many bytes as errors.
        #[arg(long)]
        max_line_bytes: Option<usize>,

        /// Events buffered between the reader thread and the printer.
        #[arg(long, default_value_t = DEFAULT_QUEUE_CAPACITY)]
        queue_capacity: usize,

        /// Print a session summary on exit.
        #[arg(long)]
        stats: bool,
    },

    /// Run a captured log through the decoder.
    Replay {
        /// Log file to read (`-` or omitted for stdin).
        file: Option<PathBuf>,

        /// Report lines longer than this many bytes as errors.
        #[arg(long)]
        max_line_bytes: Option<usize>,

        /// Print a session summary at the end.
        #[arg(long)]
        stats: bool,
    },

    /// Decode a single line and print the event.
    Decode {
        /// The line, without its terminator.
        line: String,
    },

    /// List available serial ports.
    #[command(alias = "ls")]
    Ports,
}

impl Cli {
    /// Returns the effective log level; `--verbose` wins over `--log-level`.
    #[must_use]
    pub fn log_level(&self) -> Level {
        if self.verbose {
            return Level::DEBUG;
        }
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "error" => Level::ERROR,
            _ => Level::WARN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parse() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_monitor_defaults() {
        let cli = Cli::try_parse_from(["ardu-monitor", "monitor", "--port", "/dev/ttyACM0"]).unwrap();
        let Commands::Monitor {
            port,
            baud,
            timeout_ms,
            max_line_bytes,
            queue_capacity,
            stats,
        } = cli.command
        else {
            panic!("expected monitor");
        };
        assert_eq!(port, "/dev/ttyACM0");
        assert_eq!(baud, 115_200);
        assert_eq!(timeout_ms, 200);
        assert_eq!(max_line_bytes, None);
        assert_eq!(queue_capacity, 256);
        assert!(!stats);
    }

    #[test]
    fn test_replay_file_optional() {
        let cli = Cli::try_parse_from(["ardu-monitor", "replay"]).unwrap();
        assert!(matches!(cli.command, Commands::Replay { file: None, .. }));

        let cli = Cli::try_parse_from(["ardu-monitor", "replay", "log.txt", "--stats"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Replay { file: Some(_), stats: true, .. }
        ));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["ardu-monitor", "decode", "x", "--format", "json"]).unwrap();
        assert_eq!(cli.format, "json");
    }

    #[test]
    fn test_log_level() {
        let mut cli = Cli::try_parse_from(["ardu-monitor", "ports"]).unwrap();
        assert_eq!(cli.log_level(), Level::WARN);

        cli.log_level = "TRACE".to_string();
        assert_eq!(cli.log_level(), Level::TRACE);

        cli.verbose = true;
        assert_eq!(cli.log_level(), Level::DEBUG);
    }
}
