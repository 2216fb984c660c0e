//! Error types for the serial event monitor.
//!
//! Only [`ConnectionError`] is allowed to stop the process. Everything the
//! streaming path can run into (transient reads, over-long lines, lines the
//! decoder does not understand) is absorbed into the event stream, so those
//! errors exist mostly to be rendered into `Error` events or trace logs.

use thiserror::Error;

/// Result type alias for monitor operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type.
#[derive(Error, Debug)]
pub enum Error {
    /// The transport could not be opened.
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// A read from an open transport failed.
    #[error("source error: {0}")]
    Source(#[from] SourceError),

    /// Line framing failed.
    #[error("framing error: {0}")]
    Frame(#[from] FrameError),

    /// A line could not be classified.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// CLI command errors.
    #[error("command error: {0}")]
    Command(#[from] CommandError),

    /// I/O errors outside the transport (stdout, capture files).
    #[error("I/O error: {0}")]
    Io(String),

    /// The reader thread panicked or could not be spawned.
    #[error("reader thread failed: {0}")]
    Worker(String),

    /// Configuration errors.
    #[error("configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },
}

/// The transport could not be opened.
///
/// Fatal at startup; never retried automatically.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("could not open {address}: {reason}")]
pub struct ConnectionError {
    /// Port name or identifier that was attempted.
    pub address: String,
    /// Underlying failure.
    pub reason: String,
}

/// Failures reading from an already open source.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// One poll failed; the next poll may succeed.
    #[error("read from {address} failed: {reason}")]
    TransientRead {
        /// Port name or identifier.
        address: String,
        /// Underlying failure.
        reason: String,
    },
}

/// Line framing failures.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// A line grew past the configured bound and was dropped.
    #[error("line too long: {length} bytes exceeds limit of {limit}")]
    LineTooLong {
        /// Bytes accumulated when the bound was crossed.
        length: usize,
        /// Configured `max_line_bytes`.
        limit: usize,
    },
}

/// Reasons a line is downgraded to raw text.
///
/// Both variants are normal traffic (boot banners, debug prints, firmware
/// newer than this tool) and are never surfaced as errors to consumers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The line is not a JSON object.
    #[error("malformed line: {reason}")]
    MalformedLine {
        /// Parser message.
        reason: String,
    },

    /// The line is a JSON object without a known `event` discriminant.
    #[error("unrecognized discriminant: {}", discriminant.as_deref().unwrap_or("<none>"))]
    DecodeMismatch {
        /// Discriminant as found in the line, if any.
        discriminant: Option<String>,
    },
}

/// CLI command-specific errors.
#[derive(Error, Debug)]
pub enum CommandError {
    /// Capture file does not exist.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was not found.
        path: String,
    },

    /// Output format error.
    #[error("output format error: {0}")]
    OutputFormat(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for CommandError {
    fn from(err: serde_json::Error) -> Self {
        Self::OutputFormat(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Command(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_error_names_address() {
        let err = ConnectionError {
            address: "/dev/ttyACM0".to_string(),
            reason: "No such file or directory".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "could not open /dev/ttyACM0: No such file or directory"
        );

        // Transparent at the top level so the address stays first.
        let err: Error = err.into();
        assert!(err.to_string().starts_with("could not open /dev/ttyACM0"));
        assert!(matches!(err, Error::Connection(_)));
    }

    #[test]
    fn test_frame_error_display() {
        let err = FrameError::LineTooLong {
            length: 70,
            limit: 64,
        };
        assert_eq!(
            err.to_string(),
            "line too long: 70 bytes exceeds limit of 64"
        );
    }

    #[test]
    fn test_decode_error_display() {
        let err = DecodeError::DecodeMismatch {
            discriminant: Some("reboot".to_string()),
        };
        assert_eq!(err.to_string(), "unrecognized discriminant: reboot");

        let err = DecodeError::DecodeMismatch { discriminant: None };
        assert_eq!(err.to_string(), "unrecognized discriminant: <none>");

        let err = DecodeError::MalformedLine {
            reason: "expected value".to_string(),
        };
        assert!(err.to_string().contains("expected value"));
    }

    #[test]
    fn test_source_error_display() {
        let err = SourceError::TransientRead {
            address: "COM5".to_string(),
            reason: "device disconnected".to_string(),
        };
        assert!(err.to_string().contains("COM5"));
        assert!(err.to_string().contains("device disconnected"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_error_from_serde_json() {
        let json_err = serde_json::from_str::<i32>("nope").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Command(CommandError::OutputFormat(_))));
    }

    #[test]
    fn test_error_config() {
        let err = Error::Config {
            message: "baud rate must be > 0".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "configuration error: baud rate must be > 0"
        );
    }
}
