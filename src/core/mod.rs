//! Core domain models.
//!
//! The event model and the session state built from it. These are plain
//! data types with no I/O.

pub mod event;
pub mod field;
pub mod state;

pub use event::{Event, EventKind, HOST_FRAMER, HOST_SERIAL, Origin, Payload};
pub use field::Field;
pub use state::{DispatchState, Gesture};
