//! Chain dispatcher: provider registry plus the dispatch algorithm.
//!
//! Modules:
//! - `registry`: provider storage, chain construction, debug introspection
//! - `journal`: bounded history of dispatch results
//!
//! Every dispatch rebuilds its chain from the live registry:
//! 1. collect providers that participate and expose a handler for the chord
//! 2. stable-sort them by descending priority
//! 3. keep only enabled handlers; this is the chain
//! 4. invoke each handler with a fresh [`ExecutionContext`] until one stops
//!
//! Each invocation runs inside a failure boundary. A handler that returns an
//! error or panics is recorded in the result log and the chain moves on, so a
//! broken region cannot swallow a shortcut for every region after it.

mod journal;
mod registry;

use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use chordchain_types::{ChainAction, ChainDebugInfo, ChainExecutionResult, ChainLogEntry};
use tracing::{debug, info, trace, warn};

use crate::chord::Chord;
use crate::context::ExecutionContext;
use crate::error::HandlerFault;
use crate::event::{InputEvent, KeyPress};
use crate::provider::{Handler, ShortcutProvider};

pub use journal::{DEFAULT_JOURNAL_CAPACITY, DispatchJournal};
pub use registry::Registration;

use registry::{ChainLink, SharedRegistry};

/// The host's key-press subscription feeding the dispatcher.
///
/// The dispatcher owns at most one listener and detaches it on teardown.
pub trait InputListener {
    fn detach(&mut self);
}

/// Owns the provider registry and runs dispatches against it.
pub struct ChainDispatcher {
    registry: SharedRegistry,
    journal: RefCell<DispatchJournal>,
    listener: RefCell<Option<Box<dyn InputListener>>>,
}

impl Default for ChainDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl ChainDispatcher {
    pub fn new() -> Self {
        Self::with_journal_capacity(DEFAULT_JOURNAL_CAPACITY)
    }

    pub fn with_journal_capacity(capacity: usize) -> Self {
        Self {
            registry: SharedRegistry::default(),
            journal: RefCell::new(DispatchJournal::new(capacity)),
            listener: RefCell::new(None),
        }
    }

    /// A cloneable handle for code that registers providers but never dispatches.
    pub fn handle(&self) -> DispatcherHandle {
        DispatcherHandle {
            registry: self.registry.clone(),
        }
    }

    /// Registers `provider`, silently replacing any provider with the same id.
    /// The replaced provider's `on_unregistered` hook is not called.
    pub fn register(&self, provider: Rc<dyn ShortcutProvider>) -> Registration {
        self.registry.register(provider)
    }

    /// Removes a provider and calls its `on_unregistered` hook. Unknown ids are ignored.
    pub fn unregister(&self, provider_id: &str) -> bool {
        self.registry.unregister(provider_id)
    }

    /// Enables or disables every handler a provider exposes. Unknown ids are ignored.
    pub fn set_provider_enabled(&self, provider_id: &str, enabled: bool) -> bool {
        self.registry.set_provider_enabled(provider_id, enabled)
    }

    pub fn is_registered(&self, provider_id: &str) -> bool {
        self.registry.is_registered(provider_id)
    }

    /// Registered provider ids in registration order.
    pub fn provider_ids(&self) -> Vec<String> {
        self.registry.provider_ids()
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current participants for `chord` in dispatch order.
    pub fn debug_info(&self, chord: &Chord) -> ChainDebugInfo {
        self.registry.debug_info(chord)
    }

    /// Installs the host's input listener, detaching any previous one.
    pub fn attach_listener(&self, listener: Box<dyn InputListener>) {
        let previous = self.listener.borrow_mut().replace(listener);
        if let Some(mut previous) = previous {
            previous.detach();
        }
    }

    pub fn has_listener(&self) -> bool {
        self.listener.borrow().is_some()
    }

    /// Detaches the listener and unregisters every provider.
    pub fn destroy(&self) {
        let listener = self.listener.borrow_mut().take();
        if let Some(mut listener) = listener {
            listener.detach();
        }
        let providers = self.registry.drain();
        for provider in &providers {
            provider.on_unregistered();
        }
        self.journal.borrow_mut().clear();
        info!(provider_count = providers.len(), "shortcut dispatcher destroyed");
    }

    /// The `count` most recent dispatch results, oldest first.
    pub fn recent_results(&self, count: usize) -> Vec<ChainExecutionResult> {
        self.journal.borrow().recent(count)
    }

    pub fn last_result(&self) -> Option<ChainExecutionResult> {
        self.journal.borrow().last().cloned()
    }

    pub fn set_journal_capacity(&self, capacity: usize) {
        self.journal.borrow_mut().set_max_size(capacity);
    }

    /// Normalizes a key press and dispatches its chord.
    pub async fn dispatch_key(&self, key_press: &KeyPress) -> ChainExecutionResult {
        let chord = key_press.chord();
        self.dispatch(&chord, key_press).await
    }

    /// Runs the chain for `chord`.
    ///
    /// Handler faults never escape; they show up as log entries with an error
    /// message. Every handler runs to completion before the next one starts.
    pub async fn dispatch(&self, chord: &Chord, event: &dyn InputEvent) -> ChainExecutionResult {
        let result = self.run_chain(chord, event);
        self.journal.borrow_mut().record(&result);
        result
    }

    fn run_chain(&self, chord: &Chord, event: &dyn InputEvent) -> ChainExecutionResult {
        let participants = self.registry.participants(chord);
        if participants.is_empty() {
            trace!(chord = %chord, "no providers for chord");
            return ChainExecutionResult::empty(chord.as_str());
        }

        let chain: Vec<ChainLink> = participants.into_iter().filter(|link| link.handler.is_enabled()).collect();
        if chain.is_empty() {
            trace!(chord = %chord, "every handler for chord is disabled");
            return ChainExecutionResult::empty(chord.as_str());
        }

        let snapshot: Vec<String> = chain.iter().map(|link| link.provider_id.clone()).collect();
        debug!(chord = %chord, chain = ?snapshot, "dispatch chain built");

        let mut result = ChainExecutionResult {
            chord: chord.to_string(),
            total_handlers: chain.len(),
            log: Vec::with_capacity(chain.len()),
            ..ChainExecutionResult::default()
        };

        for (index, link) in chain.iter().enumerate() {
            let mut context = ExecutionContext::new(chord, event, &link.provider_id, index, &snapshot);
            let outcome = invoke_guarded(&link.handler, &mut context);
            result.handlers_executed += 1;
            result.default_prevented |= context.is_default_prevented();
            result.propagation_stopped |= context.is_propagation_stopped();

            let entry = match outcome {
                Ok(()) => ChainLogEntry::completed(link.provider_id.as_str(), context.action()),
                Err(fault) => {
                    warn!(
                        chord = %chord,
                        provider_id = %link.provider_id,
                        position = index,
                        error = %fault,
                        "shortcut handler failed; continuing with the rest of the chain"
                    );
                    ChainLogEntry::failed(link.provider_id.as_str(), fault.to_string())
                }
            };
            result.final_action = entry.action;
            let stop = entry.action == ChainAction::Stop;
            result.log.push(entry);
            if stop {
                trace!(chord = %chord, provider_id = %link.provider_id, "chain stopped");
                break;
            }
        }

        result.executed = result.handlers_executed > 0;
        result
    }
}

/// Invokes a handler, turning both `Err` returns and panics into a fault.
fn invoke_guarded(handler: &Handler, context: &mut ExecutionContext<'_>) -> Result<(), HandlerFault> {
    match panic::catch_unwind(AssertUnwindSafe(|| handler.invoke(context))) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(error)) => Err(HandlerFault::from_error(&error)),
        Err(payload) => Err(HandlerFault::from_panic(payload)),
    }
}

/// Registration-only view of a dispatcher's registry.
#[derive(Clone)]
pub struct DispatcherHandle {
    registry: SharedRegistry,
}

impl DispatcherHandle {
    pub fn register(&self, provider: Rc<dyn ShortcutProvider>) -> Registration {
        self.registry.register(provider)
    }

    pub fn unregister(&self, provider_id: &str) -> bool {
        self.registry.unregister(provider_id)
    }

    pub fn set_provider_enabled(&self, provider_id: &str, enabled: bool) -> bool {
        self.registry.set_provider_enabled(provider_id, enabled)
    }

    pub fn is_registered(&self, provider_id: &str) -> bool {
        self.registry.is_registered(provider_id)
    }

    pub fn debug_info(&self, chord: &Chord) -> ChainDebugInfo {
        self.registry.debug_info(chord)
    }
}
