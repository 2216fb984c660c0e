//! The lazy event sequence of one connection.
//!
//! [`EventStream`] drives the poll → frame → decode cycle on demand. It is
//! an ordinary iterator: events come out in the order their lines arrived,
//! and once the stream has closed it stays closed.

use super::signal::StopSignal;
use crate::config::StreamConfig;
use crate::core::{Event, HOST_FRAMER, HOST_SERIAL};
use crate::error::Result;
use crate::io::{ByteSource, Poll, SerialSource};
use crate::protocol::{LineFramer, decode};
use serde::Serialize;
use std::collections::VecDeque;
use std::iter::FusedIterator;

/// Lifecycle of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    /// Opening the transport.
    Connecting,
    /// Transport open, events flowing.
    Streaming,
    /// Source ended or stop requested; the transport has been released.
    Closed,
    /// The transport could not be opened.
    Failed,
}

/// Forward-only sequence of events read from one source.
///
/// The source is dropped as soon as the stream closes, whether because the
/// source ended or because the [`StopSignal`] was raised.
pub struct EventStream<S> {
    source: Option<S>,
    address: String,
    framer: LineFramer,
    read_size: usize,
    pending: VecDeque<Event>,
    stop: StopSignal,
    state: ConnectionState,
    /// Set while consecutive polls keep failing; only the first is reported.
    read_failing: bool,
}

impl EventStream<SerialSource> {
    /// Opens the configured serial port and starts streaming.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Config`] for an invalid configuration and
    /// [`crate::Error::Connection`] if the port cannot be opened. There is
    /// no retry.
    pub fn connect(config: &StreamConfig) -> Result<Self> {
        config.validate()?;
        let address = &config.transport.address;
        tracing::debug!(%address, state = ?ConnectionState::Connecting, "connecting");

        match SerialSource::open(&config.transport) {
            Ok(source) => Ok(Self::new(source, config)),
            Err(err) => {
                tracing::error!(%address, state = ?ConnectionState::Failed, %err, "connection failed");
                Err(err.into())
            }
        }
    }
}

impl<S: ByteSource> EventStream<S> {
    /// Starts streaming from an already open source.
    pub fn new(source: S, config: &StreamConfig) -> Self {
        let address = source.address().to_string();
        tracing::debug!(%address, state = ?ConnectionState::Streaming, "streaming");
        Self {
            source: Some(source),
            address,
            framer: LineFramer::with_max_line_bytes(config.max_line_bytes),
            read_size: config.read_size,
            pending: VecDeque::new(),
            stop: StopSignal::new(),
            state: ConnectionState::Streaming,
            read_failing: false,
        }
    }

    /// Uses an externally owned stop signal.
    #[must_use]
    pub fn with_stop_signal(mut self, stop: StopSignal) -> Self {
        self.stop = stop;
        self
    }

    /// Returns a handle that stops this stream.
    #[must_use]
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    /// Returns the connection state.
    #[must_use]
    pub const fn state(&self) -> ConnectionState {
        self.state
    }

    /// Returns the source address.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Returns the poll timeout of the open source, if any.
    #[must_use]
    pub fn poll_timeout(&self) -> Option<std::time::Duration> {
        self.source.as_ref().map(S::poll_timeout)
    }

    /// Closes the stream and releases the source. Idempotent.
    pub fn close(&mut self) {
        if self.source.take().is_some() {
            tracing::debug!(address = %self.address, state = ?ConnectionState::Closed, "stream closed");
        }
        self.state = ConnectionState::Closed;
    }

    /// Runs one poll cycle, queueing whatever events it produced.
    fn cycle(&mut self) {
        if self.stop.is_stopped() {
            // Unterminated data is not flushed on stop: it may be half a line.
            self.close();
            return;
        }
        let Some(source) = self.source.as_mut() else {
            self.state = ConnectionState::Closed;
            return;
        };

        match source.poll(self.read_size) {
            Ok(Poll::Chunk(chunk)) => {
                if self.read_failing && !chunk.is_empty() {
                    tracing::info!(address = %self.address, "reads recovered");
                    self.read_failing = false;
                }
                for framed in self.framer.feed(chunk.as_bytes()) {
                    let event = match framed {
                        Ok(line) => {
                            tracing::trace!(%line, "line");
                            decode(&line)
                        }
                        Err(err) => Event::local_error(HOST_FRAMER, err.to_string()),
                    };
                    self.pending.push_back(event);
                }
            }
            Ok(Poll::Closed) => {
                if let Some(line) = self.framer.finish() {
                    self.pending.push_back(decode(&line));
                }
                self.close();
            }
            Err(err) => {
                let backoff = source.poll_timeout();
                if !self.read_failing {
                    tracing::warn!(%err, "transient read error");
                    self.pending
                        .push_back(Event::local_error(HOST_SERIAL, err.to_string()));
                    self.read_failing = true;
                }
                // A failing port often fails instantly; wait out one poll.
                std::thread::sleep(backoff);
            }
        }
    }
}

impl<S: ByteSource> Iterator for EventStream<S> {
    type Item = Event;

    fn next(&mut self) -> Option<Event> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Some(event);
            }
            if self.state == ConnectionState::Closed {
                return None;
            }
            self.cycle();
        }
    }
}

impl<S: ByteSource> FusedIterator for EventStream<S> {}

impl<S> std::fmt::Debug for EventStream<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventStream")
            .field("address", &self.address)
            .field("state", &self.state)
            .field("pending", &self.pending.len())
            .field("buffered_bytes", &self.framer.pending())
            .finish_non_exhaustive()
    }
}
