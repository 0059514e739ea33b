//! Closure-driven provider for UI regions.
//!
//! Most regions only need a fixed set of chords, a priority, and a way to
//! say "I'm not mounted right now". `RegionProvider` covers that without a
//! hand-written trait impl:
//!
//! ```ignore
//! let open = Rc::new(Cell::new(false));
//! let provider = RegionProvider::builder("modal")
//!     .priority(1000)
//!     .participating_when({
//!         let open = Rc::clone(&open);
//!         move || open.get()
//!     })
//!     .on(Chord::plain("Escape"), "Close dialog", move |ctx| {
//!         ctx.break_chain();
//!         Ok(())
//!     })
//!     .build();
//! ```

use std::fmt;

use anyhow::Result;
use chordchain_types::ChainAction;

use super::{Handler, HandlerMap, ShortcutProvider};
use crate::chord::Chord;
use crate::context::ExecutionContext;

type Participation = Box<dyn Fn() -> bool>;
type LifecycleHook = Box<dyn Fn()>;

/// A provider assembled from closures.
pub struct RegionProvider {
    id: String,
    priority: i32,
    default_behavior: ChainAction,
    handlers: HandlerMap,
    participation: Option<Participation>,
    registered_hook: Option<LifecycleHook>,
    unregistered_hook: Option<LifecycleHook>,
}

impl RegionProvider {
    pub fn builder(id: impl Into<String>) -> RegionProviderBuilder {
        RegionProviderBuilder::new(id)
    }

    /// Handler bound to `chord`, if this provider declared one.
    pub fn handler(&self, chord: &Chord) -> Option<&Handler> {
        self.handlers.get(chord)
    }

    /// Enables or disables every handler of this provider.
    pub fn set_enabled(&self, enabled: bool) {
        for handler in self.handlers.values() {
            handler.set_enabled(enabled);
        }
    }

    /// Whether the participation predicate currently lets this provider in.
    pub fn is_participating(&self) -> bool {
        self.participation.as_ref().is_none_or(|participating| participating())
    }
}

impl ShortcutProvider for RegionProvider {
    fn provider_id(&self) -> &str {
        &self.id
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn default_chain_behavior(&self) -> ChainAction {
        self.default_behavior
    }

    fn handlers(&self) -> HandlerMap {
        self.handlers.clone()
    }

    fn handlers_for_chord(&self, _chord: &Chord) -> Option<HandlerMap> {
        self.is_participating().then(|| self.handlers.clone())
    }

    fn on_registered(&self) {
        if let Some(hook) = &self.registered_hook {
            hook();
        }
    }

    fn on_unregistered(&self) {
        if let Some(hook) = &self.unregistered_hook {
            hook();
        }
    }
}

impl fmt::Debug for RegionProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegionProvider")
            .field("id", &self.id)
            .field("priority", &self.priority)
            .field("chords", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

struct PendingHandler {
    chord: Chord,
    description: Option<String>,
    enabled: bool,
    body: Box<dyn Fn(&mut ExecutionContext<'_>) -> Result<()>>,
}

/// Builder for [`RegionProvider`]. Handlers take the provider's final priority.
pub struct RegionProviderBuilder {
    id: String,
    priority: i32,
    default_behavior: ChainAction,
    pending: Vec<PendingHandler>,
    participation: Option<Participation>,
    registered_hook: Option<LifecycleHook>,
    unregistered_hook: Option<LifecycleHook>,
}

impl RegionProviderBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            priority: 0,
            default_behavior: ChainAction::Continue,
            pending: Vec::new(),
            participation: None,
            registered_hook: None,
            unregistered_hook: None,
        }
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn default_chain_behavior(mut self, behavior: ChainAction) -> Self {
        self.default_behavior = behavior;
        self
    }

    /// Opt the provider out of dispatch whenever `predicate` returns `false`.
    pub fn participating_when<F>(mut self, predicate: F) -> Self
    where
        F: Fn() -> bool + 'static,
    {
        self.participation = Some(Box::new(predicate));
        self
    }

    /// Declares a handler. A later declaration for the same chord replaces the earlier one.
    pub fn on<F>(self, chord: Chord, description: impl Into<String>, body: F) -> Self
    where
        F: Fn(&mut ExecutionContext<'_>) -> Result<()> + 'static,
    {
        self.push(chord, Some(description.into()), true, body)
    }

    /// Declares a handler that starts out disabled.
    pub fn on_disabled<F>(self, chord: Chord, description: impl Into<String>, body: F) -> Self
    where
        F: Fn(&mut ExecutionContext<'_>) -> Result<()> + 'static,
    {
        self.push(chord, Some(description.into()), false, body)
    }

    pub fn on_registered<F>(mut self, hook: F) -> Self
    where
        F: Fn() + 'static,
    {
        self.registered_hook = Some(Box::new(hook));
        self
    }

    pub fn on_unregistered<F>(mut self, hook: F) -> Self
    where
        F: Fn() + 'static,
    {
        self.unregistered_hook = Some(Box::new(hook));
        self
    }

    pub fn build(self) -> RegionProvider {
        let mut handlers = HandlerMap::with_capacity(self.pending.len());
        for pending in self.pending {
            let PendingHandler {
                chord,
                description,
                enabled,
                body,
            } = pending;
            let mut handler = Handler::new(self.id.clone(), chord.clone(), body).with_priority(self.priority);
            if let Some(description) = description {
                handler = handler.with_description(description);
            }
            handler.set_enabled(enabled);
            handlers.insert(chord, handler);
        }

        RegionProvider {
            id: self.id,
            priority: self.priority,
            default_behavior: self.default_behavior,
            handlers,
            participation: self.participation,
            registered_hook: self.registered_hook,
            unregistered_hook: self.unregistered_hook,
        }
    }

    fn push<F>(mut self, chord: Chord, description: Option<String>, enabled: bool, body: F) -> Self
    where
        F: Fn(&mut ExecutionContext<'_>) -> Result<()> + 'static,
    {
        self.pending.retain(|pending| pending.chord != chord);
        self.pending.push(PendingHandler {
            chord,
            description,
            enabled,
            body: Box::new(body),
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn handlers_inherit_provider_priority_and_description() {
        let provider = RegionProvider::builder("menu")
            .on(Chord::plain("Escape"), "Close menu", |_| Ok(()))
            .priority(700)
            .build();
        let handler = provider.handler(&Chord::plain("Escape")).unwrap();
        assert_eq!(handler.priority(), 700);
        assert_eq!(handler.description(), Some("Close menu"));
        assert_eq!(handler.provider_id(), "menu");
    }

    #[test]
    fn participation_predicate_controls_handlers_for_chord() {
        let visible = Rc::new(Cell::new(false));
        let provider = RegionProvider::builder("nav")
            .participating_when({
                let visible = Rc::clone(&visible);
                move || visible.get()
            })
            .on(Chord::plain("Escape"), "Close navigation", |_| Ok(()))
            .build();

        assert!(provider.handlers_for_chord(&Chord::plain("Escape")).is_none());
        visible.set(true);
        let handlers = provider.handlers_for_chord(&Chord::plain("Escape")).unwrap();
        assert!(handlers.contains_key(&Chord::plain("Escape")));
        // `handlers` ignores participation.
        visible.set(false);
        assert_eq!(provider.handlers().len(), 1);
    }

    #[test]
    fn redeclaring_a_chord_replaces_the_handler() {
        let provider = RegionProvider::builder("page")
            .on(Chord::plain("Escape"), "first", |_| Ok(()))
            .on_disabled(Chord::plain("Escape"), "second", |_| Ok(()))
            .build();
        let handler = provider.handler(&Chord::plain("Escape")).unwrap();
        assert_eq!(provider.handlers().len(), 1);
        assert_eq!(handler.description(), Some("second"));
        assert!(!handler.is_enabled());
    }

    #[test]
    fn set_enabled_toggles_every_handler() {
        let provider = RegionProvider::builder("page")
            .on(Chord::plain("Escape"), "close", |_| Ok(()))
            .on(Chord::plain("?"), "help", |_| Ok(()))
            .build();
        provider.set_enabled(false);
        assert!(provider.handlers().values().all(|handler| !handler.is_enabled()));
        provider.set_enabled(true);
        assert!(provider.handlers().values().all(Handler::is_enabled));
    }
}
