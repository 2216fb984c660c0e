//! Reader thread: runs an [`EventStream`] off the consumer's thread.
//!
//! Events are handed over through a bounded FIFO channel. When the consumer
//! falls behind, the reader blocks on the full channel and stops polling;
//! events are never dropped. The only exception is shutdown: once the stop
//! signal is raised, an event still waiting for queue space is discarded.

use super::signal::StopSignal;
use super::stream::{ConnectionState, EventStream};
use crate::core::Event;
use crate::error::{Error, Result};
use crate::io::ByteSource;
use crossbeam::channel::{self, Receiver, SendTimeoutError, Sender};
use serde::Serialize;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Name given to the reader thread.
pub const READER_THREAD_NAME: &str = "ardu-reader";

/// What the reader thread did before it exited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReaderSummary {
    /// Events handed to the consumer.
    pub events_sent: u64,
    /// State of the stream when the thread exited.
    pub final_state: ConnectionState,
}

/// Handle to a running reader thread.
#[derive(Debug)]
pub struct ReaderHandle {
    events: Receiver<Event>,
    stop: StopSignal,
    thread: JoinHandle<ReaderSummary>,
}

/// Spawns a thread that drains `stream` into a channel of `capacity` events.
///
/// # Errors
///
/// Returns [`Error::Config`] for a zero capacity and [`Error::Worker`] if
/// the thread cannot be spawned.
pub fn spawn_reader<S>(stream: EventStream<S>, capacity: usize) -> Result<ReaderHandle>
where
    S: ByteSource + Send + 'static,
{
    if capacity == 0 {
        return Err(Error::Config {
            message: "queue capacity must be > 0".to_string(),
        });
    }

    let (tx, rx) = channel::bounded(capacity);
    let stop = stream.stop_signal();

    let thread = thread::Builder::new()
        .name(READER_THREAD_NAME.to_string())
        .spawn(move || pump(stream, &tx))
        .map_err(|e| Error::Worker(e.to_string()))?;

    Ok(ReaderHandle {
        events: rx,
        stop,
        thread,
    })
}

fn pump<S: ByteSource>(mut stream: EventStream<S>, tx: &Sender<Event>) -> ReaderSummary {
    let stop = stream.stop_signal();
    let tick = stream
        .poll_timeout()
        .unwrap_or(crate::config::DEFAULT_POLL_TIMEOUT)
        .max(Duration::from_millis(1));
    let mut events_sent = 0;

    'stream: for mut event in stream.by_ref() {
        loop {
            match tx.send_timeout(event, tick) {
                Ok(()) => {
                    events_sent += 1;
                    break;
                }
                Err(SendTimeoutError::Timeout(unsent)) => {
                    if stop.is_stopped() {
                        tracing::debug!("stop requested while consumer queue was full");
                        break 'stream;
                    }
                    event = unsent;
                }
                Err(SendTimeoutError::Disconnected(_)) => {
                    tracing::debug!("consumer hung up");
                    break 'stream;
                }
            }
        }
    }

    // Releases the source on every exit path.
    stream.close();
    ReaderSummary {
        events_sent,
        final_state: stream.state(),
    }
}

impl ReaderHandle {
    /// Blocking iterator over received events; ends when the reader exits.
    pub fn events(&self) -> impl Iterator<Item = Event> + '_ {
        self.events.iter()
    }

    /// Returns the next event if one is queued.
    #[must_use]
    pub fn try_next(&self) -> Option<Event> {
        self.events.try_recv().ok()
    }

    /// Returns the number of events waiting in the queue.
    #[must_use]
    pub fn queued(&self) -> usize {
        self.events.len()
    }

    /// Returns the queue capacity.
    #[must_use]
    pub fn capacity(&self) -> Option<usize> {
        self.events.capacity()
    }

    /// Asks the reader to stop.
    pub fn stop(&self) {
        self.stop.stop();
    }

    /// Returns a clone of the reader's stop signal.
    #[must_use]
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    /// Waits for the reader to exit.
    ///
    /// The receiving side is dropped first, so a reader blocked on a full
    /// queue unblocks and exits. Events still queued are discarded; drain
    /// [`ReaderHandle::events`] first to keep them.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Worker`] if the reader thread panicked.
    pub fn join(self) -> Result<ReaderSummary> {
        let Self { events, thread, .. } = self;
        drop(events);
        thread
            .join()
            .map_err(|_| Error::Worker("reader thread panicked".to_string()))
    }
}
