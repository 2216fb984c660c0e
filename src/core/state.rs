//! Session state kept by the dispatcher.

use super::event::{Event, EventKind};
use serde::Serialize;
use std::collections::BTreeMap;

/// Most recent keyword result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Gesture {
    /// Recognized label.
    pub label: String,
    /// Confidence, when the device sent one.
    pub score: Option<f64>,
}

/// State observed over the lifetime of one dispatcher.
///
/// Only the dispatcher mutates this; handlers get a shared reference.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DispatchState {
    /// Last `state` event value.
    pub last_state: Option<String>,
    /// Last `keyword` event with a label.
    pub last_gesture: Option<Gesture>,
    /// Last menu selection or selected option.
    pub last_selection: Option<String>,
    /// Events seen per kind.
    pub counts: BTreeMap<EventKind, u64>,
    /// Events seen in total.
    pub total: u64,
}

impl DispatchState {
    /// Creates empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an event.
    ///
    /// Fields the device left out do not overwrite what was seen before.
    pub(crate) fn observe(&mut self, event: &Event) {
        *self.counts.entry(event.kind()).or_insert(0) += 1;
        self.total += 1;

        match event {
            Event::State { state } => {
                if let Some(state) = state.as_present() {
                    self.last_state = Some(state.clone());
                }
            }
            Event::Keyword { label, score } => {
                if let Some(label) = label.as_present() {
                    self.last_gesture = Some(Gesture {
                        label: label.clone(),
                        score: score.as_present().copied(),
                    });
                }
            }
            Event::Menu { selection } => {
                if let Some(selection) = selection.as_present() {
                    self.last_selection = Some(selection.clone());
                }
            }
            Event::Select { option } => {
                if let Some(option) = option.as_present() {
                    self.last_selection = Some(option.clone());
                }
            }
            Event::Data { .. } | Event::Error { .. } | Event::Raw { .. } => {}
        }
    }

    /// Returns the number of events seen of one kind.
    #[must_use]
    pub fn count(&self, kind: EventKind) -> u64 {
        self.counts.get(&kind).copied().unwrap_or(0)
    }
}
