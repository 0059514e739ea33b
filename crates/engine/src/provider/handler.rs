use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use anyhow::Result;

use crate::chord::Chord;
use crate::context::ExecutionContext;

/// Body of a handler. Returning `Err` is a handler fault; the dispatcher
/// records it and moves on to the next handler.
pub type HandlerBody = dyn Fn(&mut ExecutionContext<'_>) -> Result<()>;

#[derive(Debug, Clone)]
struct HandlerMeta {
    provider_id: String,
    chord: Chord,
    priority: i32,
    description: Option<String>,
}

/// A chord handler owned by one provider.
///
/// Clones share the enabled flag, so a provider can keep a copy and toggle it
/// while the registry holds another.
#[derive(Clone)]
pub struct Handler {
    meta: Rc<HandlerMeta>,
    enabled: Rc<Cell<bool>>,
    body: Rc<HandlerBody>,
}

impl Handler {
    /// Creates an enabled handler with priority 0.
    pub fn new<F>(provider_id: impl Into<String>, chord: Chord, body: F) -> Self
    where
        F: Fn(&mut ExecutionContext<'_>) -> Result<()> + 'static,
    {
        Self {
            meta: Rc::new(HandlerMeta {
                provider_id: provider_id.into(),
                chord,
                priority: 0,
                description: None,
            }),
            enabled: Rc::new(Cell::new(true)),
            body: Rc::new(body),
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        Rc::make_mut(&mut self.meta).priority = priority;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        Rc::make_mut(&mut self.meta).description = Some(description.into());
        self
    }

    pub fn enable(&self) {
        self.enabled.set(true);
    }

    pub fn disable(&self) {
        self.enabled.set(false);
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.set(enabled);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    pub fn provider_id(&self) -> &str {
        &self.meta.provider_id
    }

    pub fn chord(&self) -> &Chord {
        &self.meta.chord
    }

    pub fn priority(&self) -> i32 {
        self.meta.priority
    }

    pub fn description(&self) -> Option<&str> {
        self.meta.description.as_deref()
    }

    pub(crate) fn invoke(&self, context: &mut ExecutionContext<'_>) -> Result<()> {
        (self.body)(context)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("provider_id", &self.meta.provider_id)
            .field("chord", &self.meta.chord)
            .field("priority", &self.meta.priority)
            .field("enabled", &self.enabled.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_enabled_state() {
        let handler = Handler::new("modal", Chord::plain("Escape"), |_| Ok(()));
        let registry_copy = handler.clone();
        assert!(registry_copy.is_enabled());
        handler.disable();
        assert!(!registry_copy.is_enabled());
        registry_copy.enable();
        assert!(handler.is_enabled());
    }

    #[test]
    fn builder_sets_metadata() {
        let handler = Handler::new("menu", Chord::plain("Escape"), |_| Ok(()))
            .with_priority(700)
            .with_description("Close account menu");
        assert_eq!(handler.priority(), 700);
        assert_eq!(handler.description(), Some("Close account menu"));
        assert_eq!(handler.provider_id(), "menu");
        assert_eq!(handler.chord().as_str(), "Escape");
    }
}
