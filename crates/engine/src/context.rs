//! Per-invocation execution context handed to handler bodies.

use chordchain_types::ChainAction;

use crate::chord::Chord;
use crate::event::InputEvent;

/// State for exactly one handler invocation.
///
/// The dispatcher builds a fresh context right before calling a handler and
/// reads the pending action and prevention flags back once the call returns.
/// The provider snapshot is shared by every context of a dispatch and does
/// not change while the chain runs.
pub struct ExecutionContext<'a> {
    chord: &'a Chord,
    event: &'a dyn InputEvent,
    provider_id: &'a str,
    index: usize,
    chain_length: usize,
    chain: &'a [String],
    action: ChainAction,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl<'a> ExecutionContext<'a> {
    pub(crate) fn new(
        chord: &'a Chord,
        event: &'a dyn InputEvent,
        provider_id: &'a str,
        index: usize,
        chain: &'a [String],
    ) -> Self {
        Self {
            chord,
            event,
            provider_id,
            index,
            chain_length: chain.len(),
            chain,
            action: ChainAction::Continue,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    /// Lets the chain proceed to the next handler.
    pub fn next(&mut self) {
        self.action = ChainAction::Continue;
    }

    /// Ends the chain after this handler.
    pub fn break_chain(&mut self) {
        self.action = ChainAction::Stop;
    }

    /// Suppresses the host's default behavior for the key press. The event is
    /// only notified on the first call.
    pub fn prevent_default(&mut self) {
        if !self.default_prevented {
            self.default_prevented = true;
            self.event.prevent_default();
        }
    }

    /// Stops the key press from reaching further host listeners. The event is
    /// only notified on the first call.
    pub fn stop_propagation(&mut self) {
        if !self.propagation_stopped {
            self.propagation_stopped = true;
            self.event.stop_propagation();
        }
    }

    /// Whether `provider_id` takes part in the current dispatch.
    pub fn has_provider(&self, provider_id: &str) -> bool {
        self.chain.iter().any(|id| id == provider_id)
    }

    /// Copy of the provider ids taking part in the current dispatch, in order.
    pub fn provider_chain(&self) -> Vec<String> {
        self.chain.to_vec()
    }

    pub fn chord(&self) -> &Chord {
        self.chord
    }

    pub fn event(&self) -> &dyn InputEvent {
        self.event
    }

    /// Provider owning the running handler.
    pub fn provider_id(&self) -> &str {
        self.provider_id
    }

    /// Zero-based position in the chain.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn chain_length(&self) -> usize {
        self.chain_length
    }

    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 == self.chain_length
    }

    pub fn action(&self) -> ChainAction {
        self.action
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::KeyPress;

    fn chain() -> Vec<String> {
        vec!["modal".to_string(), "nav".to_string()]
    }

    #[test]
    fn defaults_to_continue() {
        let chord = Chord::plain("Escape");
        let event = KeyPress::plain("Escape");
        let chain = chain();
        let context = ExecutionContext::new(&chord, &event, "modal", 0, &chain);
        assert_eq!(context.action(), ChainAction::Continue);
        assert!(context.is_first());
        assert!(!context.is_last());
        assert_eq!(context.chain_length(), 2);
    }

    #[test]
    fn last_call_decides_the_action() {
        let chord = Chord::plain("Escape");
        let event = KeyPress::plain("Escape");
        let chain = chain();
        let mut context = ExecutionContext::new(&chord, &event, "nav", 1, &chain);
        context.break_chain();
        assert_eq!(context.action(), ChainAction::Stop);
        context.next();
        assert_eq!(context.action(), ChainAction::Continue);
        assert!(context.is_last());
    }

    #[test]
    fn prevent_default_reaches_the_event_once() {
        let chord = Chord::plain("Escape");
        let event = KeyPress::plain("Escape");
        let chain = chain();
        let mut context = ExecutionContext::new(&chord, &event, "modal", 0, &chain);
        for _ in 0..5 {
            context.prevent_default();
            context.stop_propagation();
        }
        assert!(context.is_default_prevented());
        assert!(context.is_propagation_stopped());
        assert_eq!(event.prevent_default_calls(), 1);
        assert_eq!(event.stop_propagation_calls(), 1);
    }

    #[test]
    fn membership_checks_the_snapshot() {
        let chord = Chord::plain("Escape");
        let event = KeyPress::plain("Escape");
        let chain = chain();
        let context = ExecutionContext::new(&chord, &event, "modal", 0, &chain);
        assert!(context.has_provider("nav"));
        assert!(!context.has_provider("menu"));
        assert_eq!(context.provider_chain(), chain);
    }
}
