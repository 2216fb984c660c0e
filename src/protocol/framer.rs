//! Line framing.
//!
//! Turns an arbitrarily chunked byte stream into trimmed text lines. Buffer
//! state carries over between [`LineFramer::feed`] calls, so a line (or its
//! terminator) may straddle any number of polls.

use crate::error::FrameError;

/// Line terminator used by the board.
pub const TERMINATOR: u8 = b'\n';

/// Output of one framing step.
pub type Framed = Result<String, FrameError>;

/// Splits bytes into lines.
///
/// Between calls the buffer never holds a complete terminated line.
///
/// # Examples
///
/// ```
/// use ardu_monitor::protocol::LineFramer;
///
/// let mut framer = LineFramer::new();
/// assert!(framer.feed(b"{\"event\":\"st").is_empty());
/// let lines = framer.feed(b"ate\"}\r\n");
/// assert_eq!(lines, vec![Ok("{\"event\":\"state\"}".to_string())]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct LineFramer {
    buffer: Vec<u8>,
    max_line_bytes: Option<usize>,
    /// Dropping the tail of an over-long line until its terminator.
    discarding: bool,
}

impl LineFramer {
    /// Creates an unbounded framer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buffer: Vec::new(),
            max_line_bytes: None,
            discarding: false,
        }
    }

    /// Creates a framer that rejects lines longer than `limit` bytes.
    #[must_use]
    pub const fn with_max_line_bytes(limit: Option<usize>) -> Self {
        Self {
            buffer: Vec::new(),
            max_line_bytes: limit,
            discarding: false,
        }
    }

    /// Returns the configured bound.
    #[must_use]
    pub const fn max_line_bytes(&self) -> Option<usize> {
        self.max_line_bytes
    }

    /// Returns the number of buffered bytes of the current partial line.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Feeds one chunk and returns every line it completes, in order.
    ///
    /// Empty lines are dropped. An over-long line yields exactly one
    /// [`FrameError::LineTooLong`] no matter how it was chunked; its bytes
    /// are discarded up to and including its terminator.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Framed> {
        let mut out = Vec::new();
        let mut rest = chunk;

        while let Some(pos) = rest.iter().position(|&b| b == TERMINATOR) {
            self.absorb(&rest[..pos], &mut out);
            self.complete_line(&mut out);
            rest = &rest[pos + 1..];
        }
        self.absorb(rest, &mut out);

        out
    }

    /// Flushes a trailing line that never got its terminator.
    ///
    /// Called when the source has closed for good.
    pub fn finish(&mut self) -> Option<String> {
        let discarding = std::mem::take(&mut self.discarding);
        let bytes = std::mem::take(&mut self.buffer);
        if discarding {
            return None;
        }
        to_line(&bytes)
    }

    /// Drops any partial line.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.discarding = false;
    }

    fn absorb(&mut self, bytes: &[u8], out: &mut Vec<Framed>) {
        if self.discarding || bytes.is_empty() {
            return;
        }

        let length = self.buffer.len() + bytes.len();
        if let Some(limit) = self.max_line_bytes
            && length > limit
        {
            tracing::warn!(length, limit, "dropping over-long line");
            out.push(Err(FrameError::LineTooLong { length, limit }));
            self.buffer.clear();
            self.discarding = true;
            return;
        }

        self.buffer.extend_from_slice(bytes);
    }

    fn complete_line(&mut self, out: &mut Vec<Framed>) {
        if std::mem::take(&mut self.discarding) {
            return;
        }
        let bytes = std::mem::take(&mut self.buffer);
        if let Some(line) = to_line(&bytes) {
            out.push(Ok(line));
        }
    }
}

/// Decodes and trims a line; `None` if nothing is left.
fn to_line(bytes: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(bytes);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(framed: Vec<Framed>) -> Vec<String> {
        framed.into_iter().map(Result::unwrap).collect()
    }

    #[test]
    fn test_single_chunk_multiple_lines() {
        let mut framer = LineFramer::new();
        let out = lines(framer.feed(b"one\ntwo\nthree"));
        assert_eq!(out, vec!["one", "two"]);
        assert_eq!(framer.pending(), 5);

        let out = lines(framer.feed(b"\n"));
        assert_eq!(out, vec!["three"]);
        assert_eq!(framer.pending(), 0);
    }

    #[test]
    fn test_line_split_across_polls() {
        let mut framer = LineFramer::new();
        assert!(framer.feed(b"{\"event\":").is_empty());
        assert!(framer.feed(b"\"menu\"").is_empty());
        let out = lines(framer.feed(b"}\n"));
        assert_eq!(out, vec![r#"{"event":"menu"}"#]);
    }

    #[test]
    fn test_crlf_split_between_polls() {
        let mut framer = LineFramer::new();
        assert!(framer.feed(b"BOOT OK\r").is_empty());
        let out = lines(framer.feed(b"\nnext"));
        assert_eq!(out, vec!["BOOT OK"]);
    }

    #[test]
    fn test_blank_lines_dropped() {
        let mut framer = LineFramer::new();
        let out = lines(framer.feed(b"\n  \r\n\t\nvalue\n\n"));
        assert_eq!(out, vec!["value"]);
    }

    #[test]
    fn test_empty_chunk_is_noop() {
        let mut framer = LineFramer::new();
        framer.feed(b"partial");
        assert!(framer.feed(b"").is_empty());
        assert_eq!(framer.pending(), 7);
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let mut framer = LineFramer::new();
        let out = lines(framer.feed(b"temp\xff=21\n"));
        assert_eq!(out, vec!["temp\u{fffd}=21"]);
    }

    #[test]
    fn test_overflow_without_terminator_resets() {
        let mut framer = LineFramer::with_max_line_bytes(Some(8));
        assert!(framer.feed(b"01234").is_empty());

        let out = framer.feed(b"56789");
        assert_eq!(
            out,
            vec![Err(FrameError::LineTooLong {
                length: 10,
                limit: 8
            })]
        );
        assert_eq!(framer.pending(), 0);

        // The tail of the dropped line is discarded, the next line frames.
        let out = lines(framer.feed(b"tail\nok\n"));
        assert_eq!(out, vec!["ok"]);
    }

    #[test]
    fn test_overflow_within_one_chunk() {
        let mut framer = LineFramer::with_max_line_bytes(Some(4));
        let out = framer.feed(b"abc\nabcdefgh\nxyz\n");
        assert_eq!(
            out,
            vec![
                Ok("abc".to_string()),
                Err(FrameError::LineTooLong {
                    length: 8,
                    limit: 4
                }),
                Ok("xyz".to_string()),
            ]
        );
    }

    #[test]
    fn test_line_at_limit_is_accepted() {
        let mut framer = LineFramer::with_max_line_bytes(Some(4));
        let out = lines(framer.feed(b"abcd\n"));
        assert_eq!(out, vec!["abcd"]);
    }

    #[test]
    fn test_finish_flushes_trailing_line() {
        let mut framer = LineFramer::new();
        framer.feed(b"first\nlast");
        assert_eq!(framer.finish(), Some("last".to_string()));
        assert_eq!(framer.finish(), None);
    }

    #[test]
    fn test_finish_after_overflow_discards() {
        let mut framer = LineFramer::with_max_line_bytes(Some(2));
        let out = framer.feed(b"abc");
        assert_eq!(out.len(), 1);
        assert_eq!(framer.finish(), None);
    }

    #[test]
    fn test_reset() {
        let mut framer = LineFramer::new();
        framer.feed(b"garbage");
        framer.reset();
        let out = lines(framer.feed(b"clean\n"));
        assert_eq!(out, vec!["clean"]);
    }
}
