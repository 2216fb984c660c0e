//! Byte sources.
//!
//! A [`ByteSource`] hands out whatever bytes are available within one bounded
//! wait. It knows nothing about lines or events.

use crate::error::SourceError;
use std::collections::VecDeque;
use std::io::{self, Read};
use std::time::Duration;

/// Bytes read from a source in one poll.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawChunk(Vec<u8>);

impl RawChunk {
    /// An empty chunk ("no data this cycle").
    #[must_use]
    pub const fn empty() -> Self {
        Self(Vec::new())
    }

    /// Returns the bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the number of bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when the poll produced nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for RawChunk {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for RawChunk {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl From<&str> for RawChunk {
    fn from(text: &str) -> Self {
        Self(text.as_bytes().to_vec())
    }
}

/// Outcome of one poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Poll {
    /// Bytes read, possibly none.
    Chunk(RawChunk),
    /// The source has ended and will produce nothing more.
    Closed,
}

/// A transport that yields raw bytes.
pub trait ByteSource {
    /// Reads up to `max_bytes`, waiting no longer than the source's poll
    /// timeout.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::TransientRead`] when this poll failed but the
    /// source is still usable.
    fn poll(&mut self, max_bytes: usize) -> Result<Poll, SourceError>;

    /// Returns the address this source reads from.
    fn address(&self) -> &str;

    /// Returns how long one poll may block.
    ///
    /// Used as back-off after a failed read.
    fn poll_timeout(&self) -> Duration {
        crate::config::DEFAULT_POLL_TIMEOUT
    }
}

impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
    fn poll(&mut self, max_bytes: usize) -> Result<Poll, SourceError> {
        (**self).poll(max_bytes)
    }

    fn address(&self) -> &str {
        (**self).address()
    }

    fn poll_timeout(&self) -> Duration {
        (**self).poll_timeout()
    }
}

/// Source over any [`Read`] implementation, such as a captured log file.
///
/// End of input closes the source. Each poll is a plain blocking read, so
/// this only honors the poll timeout for readers that never stall; use
/// [`crate::io::PipeSource`] for stdin and other pipes.
pub struct ReaderSource<R> {
    reader: R,
    address: String,
}

impl<R: Read> ReaderSource<R> {
    /// Wraps a reader; `address` is only used in diagnostics.
    pub fn new(reader: R, address: impl Into<String>) -> Self {
        Self {
            reader,
            address: address.into(),
        }
    }
}

impl<R: Read> ByteSource for ReaderSource<R> {
    fn poll(&mut self, max_bytes: usize) -> Result<Poll, SourceError> {
        let mut buf = vec![0u8; max_bytes.max(1)];
        loop {
            match self.reader.read(&mut buf) {
                Ok(0) => return Ok(Poll::Closed),
                Ok(n) => {
                    buf.truncate(n);
                    return Ok(Poll::Chunk(buf.into()));
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => {
                    return Err(SourceError::TransientRead {
                        address: self.address.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }
    }

    fn address(&self) -> &str {
        &self.address
    }
}

/// One scripted poll result.
#[derive(Debug, Clone)]
enum Step {
    Bytes(Vec<u8>),
    Fail(String),
}

/// Source that replays a fixed script of chunks and read failures.
///
/// After the script runs out the source either closes or, when held open,
/// keeps returning empty chunks after a short idle wait like an idle port.
///
/// # Examples
///
/// ```
/// use ardu_monitor::io::{ByteSource, Poll, ScriptedSource};
///
/// let mut source = ScriptedSource::new(["{\"event\":", "\"menu\"}\n"]);
/// assert!(matches!(source.poll(64).unwrap(), Poll::Chunk(_)));
/// assert!(matches!(source.poll(64).unwrap(), Poll::Chunk(_)));
/// assert_eq!(source.poll(64).unwrap(), Poll::Closed);
/// ```
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    steps: VecDeque<Step>,
    address: String,
    hold_open: bool,
    idle: Duration,
}

impl ScriptedSource {
    /// Creates a source that yields each chunk on its own poll, then closes.
    pub fn new<I, C>(chunks: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: AsRef<[u8]>,
    {
        Self {
            steps: chunks
                .into_iter()
                .map(|c| Step::Bytes(c.as_ref().to_vec()))
                .collect(),
            address: "scripted".to_string(),
            hold_open: false,
            idle: Duration::from_millis(1),
        }
    }

    /// Appends a chunk.
    #[must_use]
    pub fn then_bytes(mut self, chunk: impl AsRef<[u8]>) -> Self {
        self.steps.push_back(Step::Bytes(chunk.as_ref().to_vec()));
        self
    }

    /// Appends a failed read.
    #[must_use]
    pub fn then_fail(mut self, reason: impl Into<String>) -> Self {
        self.steps.push_back(Step::Fail(reason.into()));
        self
    }

    /// Keeps the source open once the script is exhausted.
    #[must_use]
    pub const fn hold_open(mut self) -> Self {
        self.hold_open = true;
        self
    }

    /// Sets the wait used for idle polls and as back-off after failures.
    #[must_use]
    pub const fn idle(mut self, idle: Duration) -> Self {
        self.idle = idle;
        self
    }

    /// Sets the address reported in diagnostics.
    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    /// Returns the number of scripted steps not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.steps.len()
    }
}

impl ByteSource for ScriptedSource {
    fn poll(&mut self, max_bytes: usize) -> Result<Poll, SourceError> {
        match self.steps.pop_front() {
            Some(Step::Bytes(mut bytes)) => {
                // Honor max_bytes like a real port would; the rest stays queued.
                if bytes.len() > max_bytes {
                    let rest = bytes.split_off(max_bytes);
                    self.steps.push_front(Step::Bytes(rest));
                }
                Ok(Poll::Chunk(bytes.into()))
            }
            Some(Step::Fail(reason)) => Err(SourceError::TransientRead {
                address: self.address.clone(),
                reason,
            }),
            None if self.hold_open => {
                std::thread::sleep(self.idle);
                Ok(Poll::Chunk(RawChunk::empty()))
            }
            None => Ok(Poll::Closed),
        }
    }

    fn address(&self) -> &str {
        &self.address
    }

    fn poll_timeout(&self) -> Duration {
        self.idle
    }
}
