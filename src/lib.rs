//! # ardu-monitor
//!
//! Host-side monitor for an embedded board that reports what it is doing as
//! newline-delimited JSON events over a serial link.
//!
//! The pipeline is strictly layered:
//!
//! - **Byte source** ([`io`]): serial port, captured log, or scripted bytes
//! - **Line framer** ([`protocol::framer`]): bytes to trimmed lines
//! - **Event decoder** ([`protocol::decoder`]): lines to [`Event`] values,
//!   never failing; unrecognized input becomes [`Event::Raw`]
//! - **Dispatcher** ([`dispatch`]): per-kind handlers and session state
//!
//! Only failing to open the transport is fatal. Read errors, over-long lines
//! and undecodable lines all end up in the event stream.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]

pub mod cli;
pub mod config;
pub mod core;
pub mod dispatch;
pub mod error;
pub mod io;
pub mod protocol;

// Re-export commonly used types at crate root
pub use error::{Error, Result};

pub use config::{StreamConfig, TransportConfig};
pub use core::{DispatchState, Event, EventKind, Field, Payload};
pub use dispatch::{ConnectionState, Dispatcher, EventStream, StopSignal, spawn_reader};
pub use io::{ByteSource, RawChunk, ReaderSource, ScriptedSource, SerialSource};
pub use protocol::{LineFramer, decode};

pub use cli::{Cli, Commands, OutputFormat};
