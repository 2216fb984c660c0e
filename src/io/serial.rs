//! Serial port source for the board's USB CDC connection.

use crate::config::TransportConfig;
use crate::error::{ConnectionError, SourceError};
use crate::io::source::{ByteSource, Poll, RawChunk};
use serde::Serialize;
use std::io::{self, Read};
use std::time::Duration;

/// Serial connection to the board.
///
/// The port is closed when this value is dropped.
pub struct SerialSource {
    port: Box<dyn serialport::SerialPort>,
    address: String,
    poll_timeout: Duration,
}

impl SerialSource {
    /// Opens the configured port.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError`] carrying the attempted address if the port
    /// does not exist, is busy, or rejects the settings.
    pub fn open(config: &TransportConfig) -> Result<Self, ConnectionError> {
        let port = serialport::new(&config.address, config.baud_rate)
            .timeout(config.poll_timeout)
            .open()
            .map_err(|e| ConnectionError {
                address: config.address.clone(),
                reason: e.to_string(),
            })?;

        tracing::debug!(
            address = %config.address,
            baud = config.baud_rate,
            "serial port opened"
        );

        Ok(Self {
            port,
            address: config.address.clone(),
            poll_timeout: config.poll_timeout,
        })
    }
}

impl ByteSource for SerialSource {
    fn poll(&mut self, max_bytes: usize) -> Result<Poll, SourceError> {
        let mut buf = vec![0u8; max_bytes.max(1)];
        match self.port.read(&mut buf) {
            Ok(n) => {
                buf.truncate(n);
                Ok(Poll::Chunk(buf.into()))
            }
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
                ) =>
            {
                Ok(Poll::Chunk(RawChunk::empty()))
            }
            Err(e) => Err(SourceError::TransientRead {
                address: self.address.clone(),
                reason: e.to_string(),
            }),
        }
    }

    fn address(&self) -> &str {
        &self.address
    }

    fn poll_timeout(&self) -> Duration {
        self.poll_timeout
    }
}

impl Drop for SerialSource {
    fn drop(&mut self) {
        tracing::debug!(address = %self.address, "serial port closed");
    }
}

/// A serial port found on this machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortInfo {
    /// Name to pass as `--port`.
    pub name: String,
    /// Port type (USB, Bluetooth, PCI, unknown).
    pub kind: String,
    /// USB product string, when known.
    pub product: Option<String>,
}

/// Lists serial ports available on this machine.
///
/// # Errors
///
/// Returns [`ConnectionError`] if the platform port enumeration fails.
pub fn list_ports() -> Result<Vec<PortInfo>, ConnectionError> {
    let ports = serialport::available_ports().map_err(|e| ConnectionError {
        address: "<enumerate>".to_string(),
        reason: e.to_string(),
    })?;

    Ok(ports
        .into_iter()
        .map(|p| {
            let (kind, product) = match p.port_type {
                serialport::SerialPortType::UsbPort(usb) => ("usb", usb.product),
                serialport::SerialPortType::BluetoothPort => ("bluetooth", None),
                serialport::SerialPortType::PciPort => ("pci", None),
                serialport::SerialPortType::Unknown => ("unknown", None),
            };
            PortInfo {
                name: p.port_name,
                kind: kind.to_string(),
                product,
            }
        })
        .collect())
}
