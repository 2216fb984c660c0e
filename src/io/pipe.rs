//! Source over a reader that may block indefinitely, such as stdin.
//!
//! The blocking reads happen on a helper thread that forwards bytes over a
//! channel, so [`PipeSource::poll`] never waits longer than its poll timeout
//! and a stop signal is noticed even while the other end stays silent.

use crate::error::SourceError;
use crate::io::source::{ByteSource, Poll, RawChunk};
use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};
use std::io::{self, Read};
use std::thread;
use std::time::Duration;

/// Name given to the helper thread.
pub const PIPE_THREAD_NAME: &str = "ardu-pipe";

/// Reads handed over but not yet consumed by the poller.
const PIPE_BACKLOG: usize = 4;

/// Bytes requested per blocking read on the helper thread.
const PIPE_READ_SIZE: usize = 1024;

#[derive(Debug)]
enum Feed {
    Bytes(Vec<u8>),
    Failed(String),
}

/// Byte source fed by a helper thread doing blocking reads.
///
/// End of input, or a failed read, closes the channel; the source then
/// reports [`Poll::Closed`] once everything sent before has been polled.
/// The helper thread exits on its own once its read returns and nobody is
/// listening any more.
#[derive(Debug)]
pub struct PipeSource {
    feed: Receiver<Feed>,
    pending: Vec<u8>,
    address: String,
    poll_timeout: Duration,
}

impl PipeSource {
    /// Starts reading `reader` on a helper thread.
    ///
    /// # Errors
    ///
    /// Returns the spawn error if the helper thread cannot be started.
    pub fn spawn<R>(reader: R, address: impl Into<String>, poll_timeout: Duration) -> io::Result<Self>
    where
        R: Read + Send + 'static,
    {
        let (tx, rx) = channel::bounded(PIPE_BACKLOG);
        thread::Builder::new()
            .name(PIPE_THREAD_NAME.to_string())
            .spawn(move || pump(reader, &tx))?;

        Ok(Self {
            feed: rx,
            pending: Vec::new(),
            address: address.into(),
            poll_timeout,
        })
    }

    fn take(&mut self, mut bytes: Vec<u8>, max_bytes: usize) -> Poll {
        if bytes.len() > max_bytes {
            self.pending = bytes.split_off(max_bytes);
        }
        Poll::Chunk(bytes.into())
    }
}

fn pump<R: Read>(mut reader: R, tx: &Sender<Feed>) {
    let mut buf = vec![0u8; PIPE_READ_SIZE];
    loop {
        let feed = match reader.read(&mut buf) {
            Ok(0) => return,
            Ok(n) => Feed::Bytes(buf[..n].to_vec()),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => Feed::Failed(e.to_string()),
        };
        let failed = matches!(feed, Feed::Failed(_));
        if tx.send(feed).is_err() || failed {
            return;
        }
    }
}

impl ByteSource for PipeSource {
    fn poll(&mut self, max_bytes: usize) -> Result<Poll, SourceError> {
        let max_bytes = max_bytes.max(1);
        if !self.pending.is_empty() {
            let bytes = std::mem::take(&mut self.pending);
            return Ok(self.take(bytes, max_bytes));
        }

        match self.feed.recv_timeout(self.poll_timeout) {
            Ok(Feed::Bytes(bytes)) => Ok(self.take(bytes, max_bytes)),
            Ok(Feed::Failed(reason)) => Err(SourceError::TransientRead {
                address: self.address.clone(),
                reason,
            }),
            Err(RecvTimeoutError::Timeout) => Ok(Poll::Chunk(RawChunk::empty())),
            Err(RecvTimeoutError::Disconnected) => Ok(Poll::Closed),
        }
    }

    fn address(&self) -> &str {
        &self.address
    }

    fn poll_timeout(&self) -> Duration {
        self.poll_timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Reader that never returns, like a terminal nobody types into.
    struct Silent;

    impl Read for Silent {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            loop {
                thread::park();
            }
        }
    }

    fn drain(source: &mut PipeSource) -> Vec<u8> {
        let mut out = Vec::new();
        loop {
            match source.poll(3).unwrap() {
                Poll::Chunk(chunk) => out.extend_from_slice(chunk.as_bytes()),
                Poll::Closed => return out,
            }
        }
    }

    #[test]
    fn test_reads_everything_then_closes() {
        let reader = Cursor::new(b"BOOT OK\nnext\n".to_vec());
        let mut source = PipeSource::spawn(reader, "stdin", Duration::from_millis(50)).unwrap();
        assert_eq!(drain(&mut source), b"BOOT OK\nnext\n");
        assert_eq!(source.poll(3).unwrap(), Poll::Closed);
        assert_eq!(source.address(), "stdin");
    }

    #[test]
    fn test_silent_reader_polls_empty_within_timeout() {
        let mut source = PipeSource::spawn(Silent, "stdin", Duration::from_millis(10)).unwrap();
        let started = std::time::Instant::now();
        assert_eq!(source.poll(16).unwrap(), Poll::Chunk(RawChunk::empty()));
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_stream_over_silent_pipe_honors_stop() {
        use crate::config::{StreamConfig, TransportConfig};
        use crate::dispatch::{ConnectionState, EventStream};

        let source = PipeSource::spawn(Silent, "stdin", Duration::from_millis(10)).unwrap();
        let config = StreamConfig::new(TransportConfig::new("stdin", 115_200));
        let mut stream = EventStream::new(source, &config);
        let stop = stream.stop_signal();

        let stopper = thread::spawn(move || {
            thread::sleep(Duration::from_millis(30));
            stop.stop();
        });
        let started = std::time::Instant::now();
        assert_eq!(stream.next(), None);
        stopper.join().unwrap();

        assert!(started.elapsed() < Duration::from_secs(1));
        assert_eq!(stream.state(), ConnectionState::Closed);
    }

    #[test]
    fn test_failed_read_reported_then_closed() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::other("pipe torn down"))
            }
        }

        let mut source = PipeSource::spawn(Broken, "stdin", Duration::from_millis(50)).unwrap();
        let err = source.poll(16).unwrap_err();
        assert!(err.to_string().contains("pipe torn down"));
        assert_eq!(source.poll(16).unwrap(), Poll::Closed);
    }
}
