//! Wire protocol: newline-delimited JSON events.
//!
//! - **Framing**: bytes to trimmed lines, with an optional length bound
//! - **Decoding**: lines to [`crate::core::Event`] values

pub mod decoder;
pub mod framer;

pub use decoder::{DISCRIMINANT, classify, decode};
pub use framer::{Framed, LineFramer, TERMINATOR};
