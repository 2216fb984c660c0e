//! Byte sources for the monitor.
//!
//! The serial port used against real hardware, reader-backed sources for
//! replaying captured logs from a file or a pipe, and a scripted source for
//! tests.

pub mod pipe;
pub mod serial;
pub mod source;

pub use pipe::{PIPE_THREAD_NAME, PipeSource};
pub use serial::{PortInfo, SerialSource, list_ports};
pub use source::{ByteSource, Poll, RawChunk, ReaderSource, ScriptedSource};
