//! CLI command implementations.
//!
//! Contains the business logic for each CLI command. Output is written to
//! the supplied writer as it is produced, since `monitor` runs until it is
//! interrupted.

use crate::cli::output::{
    OutputFormat, format_connected, format_event, format_ports, format_summary,
};
use crate::cli::parser::{Cli, Commands};
use crate::config::{DEFAULT_BAUD_RATE, DEFAULT_POLL_TIMEOUT, StreamConfig, TransportConfig};
use crate::core::DispatchState;
use crate::dispatch::{Dispatcher, EventStream, StopSignal, spawn_reader};
use crate::error::{CommandError, Result};
use crate::io::{ByteSource, PipeSource, ReaderSource, list_ports};
use crate::protocol::decode;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

/// Address reported for events replayed from stdin.
const STDIN_ADDRESS: &str = "stdin";

/// Executes the CLI command.
///
/// # Arguments
///
/// * `cli` - Parsed CLI arguments.
/// * `stop` - Raised by the binary on Ctrl-C; ends `monitor` and `replay`.
/// * `out` - Destination for command output.
///
/// # Errors
///
/// Returns an error if the command fails to execute. For `monitor` this
/// includes a port that cannot be opened.
pub fn execute(cli: &Cli, stop: &StopSignal, out: &mut dyn Write) -> Result<()> {
    let format = OutputFormat::parse(&cli.format);

    match &cli.command {
        Commands::Monitor {
            port,
            baud,
            timeout_ms,
            max_line_bytes,
            queue_capacity,
            stats,
        } => {
            let transport =
                TransportConfig::new(port.as_str(), *baud).poll_timeout(Duration::from_millis(*timeout_ms));
            let config = StreamConfig::new(transport)
                .max_line_bytes(*max_line_bytes)
                .queue_capacity(*queue_capacity);
            cmd_monitor(&config, *stats, stop, format, out)
        }
        Commands::Replay {
            file,
            max_line_bytes,
            stats,
        } => cmd_replay(file.as_deref(), *max_line_bytes, *stats, stop, format, out),
        Commands::Decode { line } => cmd_decode(line, stop, format, out),
        Commands::Ports => cmd_ports(stop, format, out),
    }
}

fn cmd_monitor(
    config: &StreamConfig,
    stats: bool,
    stop: &StopSignal,
    format: OutputFormat,
    out: &mut dyn Write,
) -> Result<()> {
    let stream = EventStream::connect(config)?.with_stop_signal(stop.clone());
    let address = stream.address().to_string();
    emit(
        out,
        &format_connected(&address, config.transport.baud_rate, format),
        stop,
    )?;

    let reader = spawn_reader(stream, config.queue_capacity)?;
    let (outcome, state) = print_events(reader.events(), stop, format, out);
    if outcome.is_err() {
        reader.stop();
    }
    let summary = reader.join()?;
    outcome?;

    tracing::info!(
        %address,
        events = summary.events_sent,
        state = ?summary.final_state,
        "monitor finished"
    );
    finish(&state, stats, stop, format, out)
}

fn cmd_replay(
    file: Option<&Path>,
    max_line_bytes: Option<usize>,
    stats: bool,
    stop: &StopSignal,
    format: OutputFormat,
    out: &mut dyn Write,
) -> Result<()> {
    let source: Box<dyn ByteSource> = match file {
        Some(path) if path != Path::new("-") => {
            if !path.exists() {
                return Err(CommandError::FileNotFound {
                    path: path.display().to_string(),
                }
                .into());
            }
            Box::new(ReaderSource::new(File::open(path)?, path.display().to_string()))
        }
        // stdin may stay open and silent; read it off-thread so Ctrl-C is seen.
        _ => Box::new(PipeSource::spawn(
            io::stdin(),
            STDIN_ADDRESS,
            DEFAULT_POLL_TIMEOUT,
        )?),
    };

    let config = StreamConfig::new(TransportConfig::new(source.address(), DEFAULT_BAUD_RATE))
        .max_line_bytes(max_line_bytes);
    config.validate()?;

    let stream = EventStream::new(source, &config).with_stop_signal(stop.clone());
    let (outcome, state) = print_events(stream, stop, format, out);
    outcome?;

    tracing::debug!(events = state.total, "replay finished");
    if stats {
        emit(out, &format_summary(&state, format), stop)?;
    }
    Ok(())
}

fn cmd_decode(line: &str, stop: &StopSignal, format: OutputFormat, out: &mut dyn Write) -> Result<()> {
    emit(out, &format_event(&decode(line), format), stop)
}

fn cmd_ports(stop: &StopSignal, format: OutputFormat, out: &mut dyn Write) -> Result<()> {
    let ports = list_ports()?;
    emit(out, &format_ports(&ports, format), stop)
}

/// Dispatches every event to a printer, returning the outcome together with
/// the final session state.
fn print_events<I>(
    events: I,
    stop: &StopSignal,
    format: OutputFormat,
    out: &mut dyn Write,
) -> (Result<u64>, DispatchState)
where
    I: IntoIterator<Item = crate::core::Event>,
{
    let mut dispatcher = Dispatcher::new();
    dispatcher.set_fallback(|event, _| emit(&mut *out, &format_event(event, format), stop));
    let outcome = dispatcher.run(events);
    (outcome, dispatcher.state().clone())
}

fn finish(
    state: &DispatchState,
    stats: bool,
    stop: &StopSignal,
    format: OutputFormat,
    out: &mut dyn Write,
) -> Result<()> {
    if stats {
        emit(out, &format_summary(state, format), stop)?;
    }
    if format == OutputFormat::Text {
        emit(out, "Bye.\n", stop)?;
    }
    Ok(())
}

/// Writes and flushes `text`.
///
/// A closed pipe (`| head`) raises the stop signal instead of failing, so
/// the session winds down the same way it does on Ctrl-C.
fn emit(out: &mut dyn Write, text: &str, stop: &StopSignal) -> Result<()> {
    if text.is_empty() {
        return Ok(());
    }
    match out.write_all(text.as_bytes()).and_then(|()| out.flush()) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
            stop.stop();
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
