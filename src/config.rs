//! Connection and stream configuration.
//!
//! Everything the pipeline needs is passed in explicitly through these
//! structs; nothing is read from process-wide state.

use crate::error::{Error, Result};
use std::time::Duration;

/// Default baud rate used by the board firmware.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Default bounded wait for one poll of the transport.
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_millis(200);

/// Default number of bytes requested per poll.
pub const DEFAULT_READ_SIZE: usize = 1024;

/// Default capacity of the reader-to-consumer queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Transport settings: where to connect and how long one poll may wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// Device path or identifier (e.g. `/dev/ttyACM0`, `COM5`).
    pub address: String,
    /// Line speed in bits per second.
    pub baud_rate: u32,
    /// Bounded wait for a single poll.
    pub poll_timeout: Duration,
}

impl TransportConfig {
    /// Creates a transport config with the default poll timeout.
    #[must_use]
    pub fn new(address: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            address: address.into(),
            baud_rate,
            poll_timeout: DEFAULT_POLL_TIMEOUT,
        }
    }

    /// Sets the poll timeout.
    #[must_use]
    pub const fn poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = timeout;
        self
    }
}

/// Full configuration of one streaming connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamConfig {
    /// Transport settings.
    pub transport: TransportConfig,
    /// Upper bound on a single line; `None` leaves the buffer unbounded.
    pub max_line_bytes: Option<usize>,
    /// Bytes requested from the source per poll.
    pub read_size: usize,
    /// Capacity of the queue between reader thread and consumer.
    pub queue_capacity: usize,
}

impl StreamConfig {
    /// Creates a stream config with defaults for everything but the transport.
    #[must_use]
    pub const fn new(transport: TransportConfig) -> Self {
        Self {
            transport,
            max_line_bytes: None,
            read_size: DEFAULT_READ_SIZE,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }

    /// Sets the line length bound.
    #[must_use]
    pub const fn max_line_bytes(mut self, limit: Option<usize>) -> Self {
        self.max_line_bytes = limit;
        self
    }

    /// Sets the per-poll read size.
    #[must_use]
    pub const fn read_size(mut self, size: usize) -> Self {
        self.read_size = size;
        self
    }

    /// Sets the queue capacity.
    #[must_use]
    pub const fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Checks the configuration before any connection is attempted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the first offending setting.
    pub fn validate(&self) -> Result<()> {
        let problem = if self.transport.address.trim().is_empty() {
            Some("address must not be empty")
        } else if self.transport.baud_rate == 0 {
            Some("baud rate must be > 0")
        } else if self.transport.poll_timeout.is_zero() {
            Some("poll timeout must be > 0")
        } else if self.read_size == 0 {
            Some("read size must be > 0")
        } else if self.queue_capacity == 0 {
            Some("queue capacity must be > 0")
        } else if self.max_line_bytes == Some(0) {
            Some("max line bytes must be > 0")
        } else {
            None
        };

        problem.map_or(Ok(()), |message| {
            Err(Error::Config {
                message: message.to_string(),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> StreamConfig {
        StreamConfig::new(TransportConfig::new("/dev/ttyACM0", DEFAULT_BAUD_RATE))
    }

    #[test]
    fn test_defaults() {
        let cfg = config();
        assert_eq!(cfg.transport.poll_timeout, Duration::from_millis(200));
        assert_eq!(cfg.max_line_bytes, None);
        assert_eq!(cfg.read_size, 1024);
        assert_eq!(cfg.queue_capacity, 256);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_builders() {
        let cfg = StreamConfig::new(
            TransportConfig::new("COM5", 9600).poll_timeout(Duration::from_millis(50)),
        )
        .max_line_bytes(Some(512))
        .read_size(64)
        .queue_capacity(8);

        assert_eq!(cfg.transport.address, "COM5");
        assert_eq!(cfg.transport.baud_rate, 9600);
        assert_eq!(cfg.transport.poll_timeout, Duration::from_millis(50));
        assert_eq!(cfg.max_line_bytes, Some(512));
        assert_eq!(cfg.read_size, 64);
        assert_eq!(cfg.queue_capacity, 8);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let cases = [
            StreamConfig::new(TransportConfig::new("  ", 9600)),
            StreamConfig::new(TransportConfig::new("COM5", 0)),
            StreamConfig::new(TransportConfig::new("COM5", 9600).poll_timeout(Duration::ZERO)),
            config().read_size(0),
            config().queue_capacity(0),
            config().max_line_bytes(Some(0)),
        ];

        for cfg in cases {
            let err = cfg.validate().unwrap_err();
            assert!(matches!(err, Error::Config { .. }), "{cfg:?}");
        }
    }
}
