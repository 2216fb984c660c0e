//! Output formatting for CLI commands.
//!
//! Supports text and JSON output formats. In JSON mode every event is one
//! compact object per line, so the output can be piped into `jq`.

use crate::core::{DispatchState, Event};
use crate::error::Error;
use crate::io::PortInfo;
use serde::Serialize;
use std::fmt::Write;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// JSON output.
    Json,
}

impl OutputFormat {
    /// Parses format from string.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Formats one event as a single line, including the newline.
#[must_use]
pub fn format_event(event: &Event, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format!("{event}\n"),
        OutputFormat::Json => {
            let mut line = serde_json::to_string(event).unwrap_or_else(|_| "{}".to_string());
            line.push('\n');
            line
        }
    }
}

/// Formats the connect banner printed before streaming starts.
#[must_use]
pub fn format_connected(address: &str, baud_rate: u32, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format!("Connected to {address} @ {baud_rate}. Waiting for lines...\n"),
        // Keep stdout a pure event stream in JSON mode.
        OutputFormat::Json => String::new(),
    }
}

/// Formats the session summary.
#[must_use]
pub fn format_summary(state: &DispatchState, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format_summary_text(state),
        OutputFormat::Json => {
            #[derive(Serialize)]
            struct Summary<'a> {
                summary: &'a DispatchState,
            }
            let mut line = format_json(&Summary { summary: state });
            line.push('\n');
            line
        }
    }
}

fn format_summary_text(state: &DispatchState) -> String {
    let mut output = String::new();
    output.push_str("Session summary\n");
    output.push_str("===============\n");
    let _ = writeln!(output, "  Events:          {}", state.total);
    for (kind, count) in &state.counts {
        let _ = writeln!(output, "  {:<16} {count}", format!("{kind}:"));
    }
    if let Some(ref last) = state.last_state {
        let _ = writeln!(output, "  Last state:      {last}");
    }
    if let Some(ref selection) = state.last_selection {
        let _ = writeln!(output, "  Last selection:  {selection}");
    }
    if let Some(ref gesture) = state.last_gesture {
        match gesture.score {
            Some(score) => {
                let _ = writeln!(output, "  Last gesture:    {} ({score})", gesture.label);
            }
            None => {
                let _ = writeln!(output, "  Last gesture:    {}", gesture.label);
            }
        }
    }
    output
}

/// Formats the serial port list.
#[must_use]
pub fn format_ports(ports: &[PortInfo], format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format_ports_text(ports),
        OutputFormat::Json => {
            let mut line = format_json(&ports);
            line.push('\n');
            line
        }
    }
}

fn format_ports_text(ports: &[PortInfo]) -> String {
    if ports.is_empty() {
        return "No serial ports found.\n".to_string();
    }

    let mut output = String::new();
    let _ = writeln!(output, "{:<24} {:<10} Product", "Port", "Type");
    output.push_str(&"-".repeat(50));
    output.push('\n');
    for port in ports {
        let _ = writeln!(
            output,
            "{:<24} {:<10} {}",
            port.name,
            port.kind,
            port.product.as_deref().unwrap_or("-")
        );
    }
    output
}

/// Formats an error for the chosen output format.
///
/// Text errors are the bare message; JSON errors are an object carrying the
/// error class and message.
#[must_use]
pub fn format_error(error: &Error, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => error.to_string(),
        OutputFormat::Json => {
            #[derive(Serialize)]
            struct ErrorOutput<'a> {
                error: &'a str,
                message: String,
            }
            format_json(&ErrorOutput {
                error: error_class(error),
                message: error.to_string(),
            })
        }
    }
}

const fn error_class(error: &Error) -> &'static str {
    match error {
        Error::Connection(_) => "connection",
        Error::Source(_) => "source",
        Error::Frame(_) => "frame",
        Error::Decode(_) => "decode",
        Error::Command(_) => "command",
        Error::Io(_) => "io",
        Error::Worker(_) => "worker",
        Error::Config { .. } => "config",
    }
}

/// Formats a value as compact JSON.
fn format_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{EventKind, Field};
    use crate::error::ConnectionError;
    use crate::protocol::decode;

    #[test]
    fn test_output_format_from_str() {
        assert_eq!(OutputFormat::parse("json"), OutputFormat::Json);
        assert_eq!(OutputFormat::parse("JSON"), OutputFormat::Json);
        assert_eq!(OutputFormat::parse("text"), OutputFormat::Text);
        assert_eq!(OutputFormat::parse("unknown"), OutputFormat::Text);
    }

    #[test]
    fn test_format_event_text() {
        let event = decode(r#"{"event":"keyword","label":"left","score":0.91}"#);
        assert_eq!(
            format_event(&event, OutputFormat::Text),
            "[KW] label=left score=0.91\n"
        );
    }

    #[test]
    fn test_format_event_json_is_one_line() {
        let event = decode(r#"{"event":"state","state":"idle"}"#);
        let line = format_event(&event, OutputFormat::Json);
        assert!(line.ends_with('\n'));
        assert_eq!(line.matches('\n').count(), 1);

        let value: serde_json::Value = serde_json::from_str(line.trim_end()).unwrap();
        assert_eq!(value["event"], "state");
        assert_eq!(value["state"], "idle");
    }

    #[test]
    fn test_connected_banner() {
        assert_eq!(
            format_connected("/dev/ttyACM0", 115_200, OutputFormat::Text),
            "Connected to /dev/ttyACM0 @ 115200. Waiting for lines...\n"
        );
        assert!(format_connected("/dev/ttyACM0", 115_200, OutputFormat::Json).is_empty());
    }

    #[test]
    fn test_format_summary() {
        let mut state = DispatchState::new();
        state.total = 3;
        state.counts.insert(EventKind::Raw, 2);
        state.counts.insert(EventKind::State, 1);
        state.last_state = Some("idle".to_string());

        let text = format_summary(&state, OutputFormat::Text);
        assert!(text.contains("Events:          3"));
        assert!(text.contains("raw:"));
        assert!(text.contains("Last state:      idle"));

        let json = format_summary(&state, OutputFormat::Json);
        let value: serde_json::Value = serde_json::from_str(json.trim_end()).unwrap();
        assert_eq!(value["summary"]["total"], 3);
        assert_eq!(value["summary"]["counts"]["raw"], 2);
    }

    #[test]
    fn test_format_ports_empty() {
        assert_eq!(
            format_ports(&[], OutputFormat::Text),
            "No serial ports found.\n"
        );
        assert_eq!(format_ports(&[], OutputFormat::Json), "[]\n");
    }

    #[test]
    fn test_format_error() {
        let err = Error::from(ConnectionError {
            address: "/dev/ttyUSB9".to_string(),
            reason: "No such file or directory".to_string(),
        });
        let text = format_error(&err, OutputFormat::Text);
        assert!(text.contains("/dev/ttyUSB9"));

        let json = format_error(&err, OutputFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["error"], "connection");
    }

    #[test]
    fn test_missing_fields_in_json() {
        let event = Event::Select {
            option: Field::Missing,
        };
        let line = format_event(&event, OutputFormat::Json);
        assert_eq!(line, "{\"event\":\"select\"}\n");
    }
}
