//! Input events as seen by the dispatcher.
//!
//! The dispatcher never inspects host-specific event types. It only needs to
//! ask the originating event to suppress its default behavior or to stop
//! propagating, which is what [`InputEvent`] captures. [`KeyPress`] is the
//! concrete event the terminal host and tests feed in.

use std::cell::Cell;

use crate::chord::{Chord, Modifiers};

/// The originating input event of a dispatch.
pub trait InputEvent {
    /// Suppresses the host's default behavior for this event.
    fn prevent_default(&self);
    /// Prevents the event from reaching further host listeners.
    fn stop_propagation(&self);
}

/// A raw key press: base key name plus modifier flags.
///
/// Prevention and propagation requests are counted so the host can act on
/// them after dispatch and tests can assert how often they fired.
#[derive(Debug, Clone, Default)]
pub struct KeyPress {
    key: String,
    modifiers: Modifiers,
    prevent_default_calls: Cell<usize>,
    stop_propagation_calls: Cell<usize>,
}

impl KeyPress {
    pub fn new(key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self {
            key: key.into(),
            modifiers,
            ..Self::default()
        }
    }

    /// A key press without modifiers.
    pub fn plain(key: impl Into<String>) -> Self {
        Self::new(key, Modifiers::NONE)
    }

    pub fn with_ctrl(mut self) -> Self {
        self.modifiers.ctrl = true;
        self
    }

    pub fn with_meta(mut self) -> Self {
        self.modifiers.meta = true;
        self
    }

    pub fn with_alt(mut self) -> Self {
        self.modifiers.alt = true;
        self
    }

    pub fn with_shift(mut self) -> Self {
        self.modifiers.shift = true;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    /// Canonical chord for this key press.
    pub fn chord(&self) -> Chord {
        Chord::from_parts(self.modifiers, &self.key)
    }

    pub fn is_default_prevented(&self) -> bool {
        self.prevent_default_calls.get() > 0
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.stop_propagation_calls.get() > 0
    }

    /// How many times `prevent_default` reached this event.
    pub fn prevent_default_calls(&self) -> usize {
        self.prevent_default_calls.get()
    }

    /// How many times `stop_propagation` reached this event.
    pub fn stop_propagation_calls(&self) -> usize {
        self.stop_propagation_calls.get()
    }
}

impl InputEvent for KeyPress {
    fn prevent_default(&self) {
        self.prevent_default_calls.set(self.prevent_default_calls.get() + 1);
    }

    fn stop_propagation(&self) {
        self.stop_propagation_calls.set(self.stop_propagation_calls.get() + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chord_ignores_the_order_modifiers_were_set_in() {
        let first = KeyPress::plain("k").with_shift().with_ctrl();
        let second = KeyPress::plain("k").with_ctrl().with_shift();
        assert_eq!(first.chord(), second.chord());
        assert_eq!(first.chord().as_str(), "Ctrl+Shift+k");
    }

    #[test]
    fn key_press_counts_prevention_requests() {
        let event = KeyPress::plain("Escape");
        assert!(!event.is_default_prevented());
        event.prevent_default();
        event.prevent_default();
        assert!(event.is_default_prevented());
        assert_eq!(event.prevent_default_calls(), 2);
        assert!(!event.is_propagation_stopped());
    }
}
