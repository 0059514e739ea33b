//! # Chordchain Engine
//!
//! Keyboard-shortcut dispatch core. Independent UI regions (dialogs,
//! navigation panels, account menus, page surfaces) register as providers and
//! react to the same key combination without coordinating with each other.
//!
//! ## Usage
//!
//! ```rust
//! use std::rc::Rc;
//! use chordchain_engine::{ChainDispatcher, Chord, KeyPress, RegionProvider};
//!
//! # tokio_test_block_on(async {
//! let dispatcher = ChainDispatcher::new();
//! dispatcher.register(Rc::new(
//!     RegionProvider::builder("modal")
//!         .priority(1000)
//!         .on(Chord::plain("Escape"), "Close dialog", |ctx| {
//!             ctx.prevent_default();
//!             ctx.break_chain();
//!             Ok(())
//!         })
//!         .build(),
//! ));
//!
//! let result = dispatcher.dispatch_key(&KeyPress::plain("Escape")).await;
//! assert_eq!(result.handlers_executed, 1);
//! # });
//! # fn tokio_test_block_on<F: std::future::Future>(future: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(future)
//! # }
//! ```
//!
//! ## Architecture
//!
//! - **`chord`**: canonical chord strings and parsing
//! - **`event`**: the `InputEvent` seam and the `KeyPress` event
//! - **`provider`**: provider/handler contract and the closure-driven `RegionProvider`
//! - **`context`**: per-invocation `ExecutionContext`
//! - **`dispatcher`**: registry, chain construction, failure isolation, journal

pub mod chord;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod provider;

pub use chord::{Chord, ChordParseError, Modifiers, canonicalize_key};
pub use context::ExecutionContext;
pub use dispatcher::{ChainDispatcher, DEFAULT_JOURNAL_CAPACITY, DispatchJournal, DispatcherHandle, InputListener, Registration};
pub use error::HandlerFault;
pub use event::{InputEvent, KeyPress};
pub use provider::{Handler, HandlerBody, HandlerMap, RegionProvider, RegionProviderBuilder, ShortcutProvider};

pub use chordchain_types::{ChainAction, ChainDebugInfo, ChainExecutionResult, ChainLogEntry, ParticipantInfo};
