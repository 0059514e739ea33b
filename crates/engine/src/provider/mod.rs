//! Provider and handler contract.
//!
//! Modules:
//! - `handler`: `Handler`, a chord handler with a shared enabled flag
//! - `region`: `RegionProvider`, a closure-driven provider for UI regions
//!
//! A UI region joins the dispatch chain by implementing [`ShortcutProvider`]
//! and registering with the dispatcher. Participation is decided at two
//! levels: `handlers_for_chord` may return `None` to opt the whole provider
//! out (for example while its panel is hidden), and each returned handler
//! carries its own enabled flag.

mod handler;
mod region;

use chordchain_types::ChainAction;
use indexmap::IndexMap;

use crate::chord::Chord;

pub use handler::{Handler, HandlerBody};
pub use region::{RegionProvider, RegionProviderBuilder};

/// Handlers exposed by a provider, keyed by chord in declaration order.
pub type HandlerMap = IndexMap<Chord, Handler>;

/// Contract implemented by every UI region that reacts to shortcuts.
pub trait ShortcutProvider {
    /// Stable identifier, unique within a registry.
    fn provider_id(&self) -> &str;

    /// Higher priorities dispatch earlier. Equal priorities keep registration order.
    fn priority(&self) -> i32 {
        0
    }

    /// Advisory default for handlers of this provider. The dispatcher does not
    /// enforce it; each invocation decides through its context.
    fn default_chain_behavior(&self) -> ChainAction {
        ChainAction::Continue
    }

    /// Every handler this provider owns, whether or not it participates right now.
    fn handlers(&self) -> HandlerMap;

    /// Handlers offered for a dispatch of `chord`, or `None` when the provider
    /// is not participating at the moment.
    fn handlers_for_chord(&self, _chord: &Chord) -> Option<HandlerMap> {
        Some(self.handlers())
    }

    /// Called once after the provider has been registered.
    fn on_registered(&self) {}

    /// Called once after the provider has been unregistered.
    fn on_unregistered(&self) {}
}
