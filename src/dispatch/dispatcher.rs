//! Routing of events to handlers by kind.

use super::handler::{Handler, PassThrough};
use crate::core::{DispatchState, Event, EventKind};
use crate::error::Result;
use std::collections::HashMap;

/// Routes events to per-kind handlers and owns the session state.
///
/// Kinds without a registered handler go to the fallback, which by default
/// is [`PassThrough`]; no event is ever unhandled.
///
/// # Examples
///
/// ```
/// use ardu_monitor::core::EventKind;
/// use ardu_monitor::dispatch::Dispatcher;
/// use ardu_monitor::protocol::decode;
///
/// let mut menus = Vec::new();
/// {
///     let mut dispatcher = Dispatcher::new();
///     dispatcher.on(EventKind::Menu, |event, _state| {
///         menus.push(event.to_string());
///         Ok(())
///     });
///     dispatcher
///         .run([
///             decode(r#"{"event":"menu","selection":"home"}"#),
///             decode("BOOT OK"),
///         ])
///         .unwrap();
///     assert_eq!(dispatcher.state().total, 2);
/// }
/// assert_eq!(menus, vec!["[MENU] selection=home"]);
/// ```
pub struct Dispatcher<'h> {
    handlers: HashMap<EventKind, Box<dyn Handler + 'h>>,
    fallback: Box<dyn Handler + 'h>,
    state: DispatchState,
}

impl<'h> Dispatcher<'h> {
    /// Creates a dispatcher with no handlers and the pass-through fallback.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            fallback: Box::new(PassThrough),
            state: DispatchState::new(),
        }
    }

    /// Registers a closure for one kind, replacing any previous handler.
    pub fn on<F>(&mut self, kind: EventKind, handler: F) -> &mut Self
    where
        F: FnMut(&Event, &DispatchState) -> Result<()> + 'h,
    {
        self.handlers.insert(kind, Box::new(handler));
        self
    }

    /// Registers a handler for one kind, returning the one it replaces.
    pub fn register(
        &mut self,
        kind: EventKind,
        handler: Box<dyn Handler + 'h>,
    ) -> Option<Box<dyn Handler + 'h>> {
        self.handlers.insert(kind, handler)
    }

    /// Removes the handler for one kind; its events go to the fallback.
    pub fn unregister(&mut self, kind: EventKind) -> Option<Box<dyn Handler + 'h>> {
        self.handlers.remove(&kind)
    }

    /// Replaces the fallback handler.
    pub fn set_fallback<F>(&mut self, handler: F) -> &mut Self
    where
        F: FnMut(&Event, &DispatchState) -> Result<()> + 'h,
    {
        self.fallback = Box::new(handler);
        self
    }

    /// Returns `true` if a handler is registered for `kind`.
    #[must_use]
    pub fn has_handler(&self, kind: EventKind) -> bool {
        self.handlers.contains_key(&kind)
    }

    /// Returns the session state.
    #[must_use]
    pub const fn state(&self) -> &DispatchState {
        &self.state
    }

    /// Records one event and hands it to its handler.
    ///
    /// # Errors
    ///
    /// Returns the handler's error. The state update has already happened.
    pub fn dispatch(&mut self, event: Event) -> Result<()> {
        self.state.observe(&event);
        let kind = event.kind();
        match self.handlers.get_mut(&kind) {
            Some(handler) => handler.handle(&event, &self.state),
            None => self.fallback.handle(&event, &self.state),
        }
    }

    /// Dispatches every event in order until the sequence ends.
    ///
    /// Returns the number of events dispatched.
    ///
    /// # Errors
    ///
    /// Stops at the first handler error.
    pub fn run<I>(&mut self, events: I) -> Result<u64>
    where
        I: IntoIterator<Item = Event>,
    {
        let mut count = 0;
        for event in events {
            self.dispatch(event)?;
            count += 1;
        }
        Ok(count)
    }
}

impl Default for Dispatcher<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Dispatcher<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<_> = self.handlers.keys().collect();
        kinds.sort();
        f.debug_struct("Dispatcher")
            .field("handlers", &kinds)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
