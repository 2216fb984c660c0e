//! CLI layer for ardu-monitor.
//!
//! Provides the command-line interface using clap, with commands for
//! monitoring a port, replaying captured logs, decoding single lines and
//! listing ports.

pub mod commands;
pub mod output;
pub mod parser;

pub use commands::execute;
pub use output::OutputFormat;
pub use parser::{Cli, Commands};
