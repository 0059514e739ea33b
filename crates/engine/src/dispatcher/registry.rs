//! Provider registry and chain construction.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use chordchain_types::{ChainDebugInfo, ParticipantInfo};
use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::chord::Chord;
use crate::provider::{Handler, ShortcutProvider};

/// One position of a dispatch chain before enabled filtering.
#[derive(Debug, Clone)]
pub(crate) struct ChainLink {
    pub(crate) provider_id: String,
    pub(crate) priority: i32,
    pub(crate) handler: Handler,
}

/// Registered providers in registration order.
#[derive(Default)]
pub(crate) struct ProviderRegistry {
    providers: IndexMap<String, Rc<dyn ShortcutProvider>>,
}

impl ProviderRegistry {
    /// Inserts `provider`, returning the entry it replaced. A replaced entry
    /// keeps its original position in registration order.
    fn insert(&mut self, provider: Rc<dyn ShortcutProvider>) -> Option<Rc<dyn ShortcutProvider>> {
        self.providers.insert(provider.provider_id().to_string(), provider)
    }

    fn remove(&mut self, provider_id: &str) -> Option<Rc<dyn ShortcutProvider>> {
        self.providers.shift_remove(provider_id)
    }

    /// Removes the entry under `provider_id` only if it is `expected`.
    fn remove_if_same(&mut self, provider_id: &str, expected: &Weak<dyn ShortcutProvider>) -> Option<Rc<dyn ShortcutProvider>> {
        let current = self.providers.get(provider_id)?;
        if !std::ptr::addr_eq(Rc::as_ptr(current), expected.as_ptr()) {
            return None;
        }
        self.remove(provider_id)
    }

    fn get(&self, provider_id: &str) -> Option<Rc<dyn ShortcutProvider>> {
        self.providers.get(provider_id).cloned()
    }

    fn drain(&mut self) -> Vec<Rc<dyn ShortcutProvider>> {
        self.providers.drain(..).map(|(_, provider)| provider).collect()
    }

    fn snapshot(&self) -> Vec<Rc<dyn ShortcutProvider>> {
        self.providers.values().cloned().collect()
    }
}

/// Registry shared between the dispatcher, its handles and registrations.
///
/// Borrows never outlive a single method call, and provider callbacks always
/// run after the borrow is released, so providers and handlers may call back
/// into the registry.
#[derive(Clone, Default)]
pub(crate) struct SharedRegistry {
    inner: Rc<RefCell<ProviderRegistry>>,
}

impl SharedRegistry {
    pub(crate) fn register(&self, provider: Rc<dyn ShortcutProvider>) -> Registration {
        let provider_id = provider.provider_id().to_string();
        let replaced = self.inner.borrow_mut().insert(Rc::clone(&provider));
        if replaced.is_some() {
            debug!(provider_id = %provider_id, "replacing provider registered under the same id");
        } else {
            debug!(provider_id = %provider_id, priority = provider.priority(), "provider registered");
        }
        provider.on_registered();
        Registration {
            provider_id,
            provider: Rc::downgrade(&provider),
            registry: Rc::downgrade(&self.inner),
        }
    }

    pub(crate) fn unregister(&self, provider_id: &str) -> bool {
        unregister_from(&self.inner, provider_id)
    }

    pub(crate) fn set_provider_enabled(&self, provider_id: &str, enabled: bool) -> bool {
        let Some(provider) = self.inner.borrow().get(provider_id) else {
            trace!(provider_id = %provider_id, "set_provider_enabled for unknown provider ignored");
            return false;
        };
        let handlers = provider.handlers();
        for handler in handlers.values() {
            handler.set_enabled(enabled);
        }
        debug!(
            provider_id = %provider_id,
            enabled,
            handler_count = handlers.len(),
            "provider handlers toggled"
        );
        true
    }

    pub(crate) fn is_registered(&self, provider_id: &str) -> bool {
        self.inner.borrow().providers.contains_key(provider_id)
    }

    pub(crate) fn provider_ids(&self) -> Vec<String> {
        self.inner.borrow().providers.keys().cloned().collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.inner.borrow().providers.len()
    }

    pub(crate) fn drain(&self) -> Vec<Rc<dyn ShortcutProvider>> {
        self.inner.borrow_mut().drain()
    }

    /// Every provider participating in `chord`, highest priority first, with
    /// disabled handlers still included. Equal priorities keep registration order.
    pub(crate) fn participants(&self, chord: &Chord) -> Vec<ChainLink> {
        let providers = self.inner.borrow().snapshot();
        let mut links: Vec<ChainLink> = providers
            .iter()
            .filter_map(|provider| {
                let mut handlers = provider.handlers_for_chord(chord)?;
                let handler = handlers.swap_remove(chord)?;
                Some(ChainLink {
                    provider_id: provider.provider_id().to_string(),
                    priority: provider.priority(),
                    handler,
                })
            })
            .collect();
        // `sort_by` is stable, which keeps registration order among equal priorities.
        links.sort_by(|left, right| right.priority.cmp(&left.priority));
        links
    }

    pub(crate) fn debug_info(&self, chord: &Chord) -> ChainDebugInfo {
        let participants: Vec<ParticipantInfo> = self
            .participants(chord)
            .into_iter()
            .map(|link| ParticipantInfo {
                enabled: link.handler.is_enabled(),
                priority: link.priority,
                description: link.handler.description().map(str::to_string),
                provider_id: link.provider_id,
            })
            .collect();
        ChainDebugInfo {
            chord: chord.to_string(),
            total: participants.len(),
            participants,
        }
    }
}

fn unregister_from(registry: &RefCell<ProviderRegistry>, provider_id: &str) -> bool {
    let removed = registry.borrow_mut().remove(provider_id);
    finish_unregister(removed, provider_id)
}

fn finish_unregister(removed: Option<Rc<dyn ShortcutProvider>>, provider_id: &str) -> bool {
    match removed {
        Some(provider) => {
            debug!(provider_id = %provider_id, "provider unregistered");
            provider.on_unregistered();
            true
        }
        None => {
            trace!(provider_id = %provider_id, "unregister for unknown provider ignored");
            false
        }
    }
}

/// Returned by `register`; calling [`Registration::unregister`] removes the
/// provider again.
///
/// Dropping a registration does not unregister anything. The handle only
/// holds weak references, so it never keeps a torn-down dispatcher or its
/// provider alive.
pub struct Registration {
    provider_id: String,
    provider: Weak<dyn ShortcutProvider>,
    registry: Weak<RefCell<ProviderRegistry>>,
}

impl Registration {
    pub fn provider_id(&self) -> &str {
        &self.provider_id
    }

    /// Unregisters the provider this handle was issued for. A handle whose
    /// provider has since been replaced under the same id is a no-op.
    /// Returns `false` when nothing was removed or the dispatcher is gone.
    pub fn unregister(self) -> bool {
        let Some(registry) = self.registry.upgrade() else {
            return false;
        };
        let removed = registry.borrow_mut().remove_if_same(&self.provider_id, &self.provider);
        finish_unregister(removed, &self.provider_id)
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration").field("provider_id", &self.provider_id).finish()
    }
}
