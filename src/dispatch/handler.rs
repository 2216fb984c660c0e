//! Event handler trait.

use crate::core::{DispatchState, Event};
use crate::error::Result;

/// Consumer of dispatched events.
///
/// Handlers see the dispatcher's state after it has been updated for the
/// event being handled, and cannot modify it.
///
/// Any `FnMut(&Event, &DispatchState) -> Result<()>` closure is a handler.
pub trait Handler {
    /// Handles one event.
    ///
    /// # Errors
    ///
    /// Errors are returned to whoever drives the dispatcher.
    fn handle(&mut self, event: &Event, state: &DispatchState) -> Result<()>;
}

impl<F> Handler for F
where
    F: FnMut(&Event, &DispatchState) -> Result<()>,
{
    fn handle(&mut self, event: &Event, state: &DispatchState) -> Result<()> {
        self(event, state)
    }
}

/// Default handler for kinds with no registration: logs the text form.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl Handler for PassThrough {
    fn handle(&mut self, event: &Event, _state: &DispatchState) -> Result<()> {
        tracing::info!(kind = %event.kind(), "{event}");
        Ok(())
    }
}
