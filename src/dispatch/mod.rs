//! Event delivery.
//!
//! - [`EventStream`]: the lazy event sequence of one connection
//! - [`Dispatcher`]: per-kind handler routing plus session state
//! - [`spawn_reader`]: runs a stream on its own thread behind a bounded queue
//! - [`StopSignal`]: cooperative cancellation checked once per poll

pub mod dispatcher;
pub mod handler;
pub mod reader;
pub mod signal;
pub mod stream;

pub use dispatcher::Dispatcher;
pub use handler::{Handler, PassThrough};
pub use reader::{READER_THREAD_NAME, ReaderHandle, ReaderSummary, spawn_reader};
pub use signal::StopSignal;
pub use stream::{ConnectionState, EventStream};
