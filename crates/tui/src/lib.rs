//! # Chordchain Dashboard
//!
//! A small terminal dashboard whose regions (confirmation dialog, navigation
//! panel, account menu, survey page and a shortcut diagnostics overlay) each
//! register as independent shortcut providers with one
//! [`chordchain_engine::ChainDispatcher`].
//!
//! - **`input`**: crossterm listener thread and key-event conversion
//! - **`dashboard`**: shared state, region providers, host defaults
//! - **`ui`**: ratatui rendering
//! - **`runtime`**: terminal lifecycle and event loop

pub mod dashboard;
pub mod input;
mod runtime;
mod ui;

use anyhow::Result;
use chordchain_util::UserPreferences;

pub use dashboard::{Dashboard, DashboardState, HostAction, Region};
pub use input::{CrosstermListener, key_press_from_event};

/// Runs the dashboard until the user quits.
pub async fn run(preferences: UserPreferences) -> Result<()> {
    runtime::run_dashboard(preferences).await
}
