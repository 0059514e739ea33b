//! The dashboard host: shared state, its regions, and the dispatcher they register with.
//!
//! [`Dashboard`] is usable without a terminal. The runtime feeds it key presses
//! from crossterm, the CLI feeds it a single parsed chord.

pub mod regions;
pub mod state;
pub mod survey;

use std::rc::Rc;

use chordchain_engine::{ChainDispatcher, ChainExecutionResult, Chord, DEFAULT_JOURNAL_CAPACITY, KeyPress, Modifiers};
use chordchain_util::UserPreferences;
use tracing::{debug, warn};

pub use regions::{ACCOUNT_MENU_ID, DEBUG_OVERLAY_ID, MODAL_DIALOG_ID, NAV_PANEL_ID, SURVEY_PAGE_ID};
pub use state::{DashboardState, Region};
pub use survey::Survey;

/// Upper bound on the dispatch journal size accepted from preferences.
pub const MAX_JOURNAL_CAPACITY: usize = 1024;

/// Host-side outcome of a key press once the chain has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostAction {
    /// The chain consumed the key or the host has no default for it.
    None,
    /// The host's default for `q`.
    Quit,
}

pub struct Dashboard {
    dispatcher: ChainDispatcher,
    state: Rc<DashboardState>,
}

impl Dashboard {
    /// Builds the dashboard, registers every region and applies `preferences`.
    pub fn new(preferences: &UserPreferences) -> Self {
        Self::with_state(preferences, DashboardState::default())
    }

    pub fn with_state(preferences: &UserPreferences, state: DashboardState) -> Self {
        let capacity = journal_capacity(preferences);
        let dashboard = Self {
            dispatcher: ChainDispatcher::with_journal_capacity(capacity),
            state: Rc::new(state),
        };
        dashboard.register_regions();
        dashboard.apply_preferences(preferences);
        dashboard
    }

    fn register_regions(&self) {
        let handle = self.dispatcher.handle();
        handle.register(Rc::new(regions::debug_overlay(&self.state)));
        handle.register(Rc::new(regions::modal_dialog(&self.state)));
        handle.register(Rc::new(regions::account_menu(&self.state)));
        handle.register(Rc::new(regions::nav_panel(&self.state)));
        handle.register(Rc::new(regions::survey_page(&self.state)));
    }

    fn apply_preferences(&self, preferences: &UserPreferences) {
        for provider_id in preferences.disabled_providers() {
            if !self.dispatcher.set_provider_enabled(provider_id, false) {
                warn!(provider_id = %provider_id, "preferences disable an unknown provider");
            }
        }
        if preferences.show_debug_overlay() {
            self.state.set_open(Region::Overlay, true);
        }
    }

    pub fn dispatcher(&self) -> &ChainDispatcher {
        &self.dispatcher
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    /// Opens the given regions, as if the user had navigated to them.
    pub fn open_regions(&self, regions: &[Region]) {
        for region in regions {
            self.state.set_open(*region, true);
        }
    }

    /// Runs the shortcut chain for `key_press`, then applies the host default
    /// unless a handler prevented it.
    pub async fn handle_key(&self, key_press: &KeyPress) -> (ChainExecutionResult, HostAction) {
        let result = self.dispatcher.dispatch_key(key_press).await;
        let action = self.host_default(&key_press.chord(), result.default_prevented);
        debug!(
            chord = %result.chord,
            handlers_executed = result.handlers_executed,
            default_prevented = result.default_prevented,
            host_action = ?action,
            "key handled"
        );
        (result, action)
    }

    /// Dispatches a chord typed on the command line.
    pub async fn handle_chord(&self, chord: &Chord) -> (ChainExecutionResult, HostAction) {
        self.handle_key(&KeyPress::new(chord.key(), chord.modifiers())).await
    }

    fn host_default(&self, chord: &Chord, default_prevented: bool) -> HostAction {
        if default_prevented {
            return HostAction::None;
        }
        if *chord == Chord::plain("q") {
            self.state.request_quit();
            return HostAction::Quit;
        }
        HostAction::None
    }

    /// Chord the diagnostic overlay inspects.
    pub fn inspected_chord() -> Chord {
        Chord::from_parts(Modifiers::NONE, "Escape")
    }

    /// Tears down the dispatcher: detaches the input listener and unregisters every region.
    pub fn shutdown(&self) {
        self.dispatcher.destroy();
    }
}

fn journal_capacity(preferences: &UserPreferences) -> usize {
    match preferences.journal_capacity() {
        None => DEFAULT_JOURNAL_CAPACITY,
        Some(requested) if requested > MAX_JOURNAL_CAPACITY => {
            warn!(requested, max = MAX_JOURNAL_CAPACITY, "journal capacity from preferences clamped");
            MAX_JOURNAL_CAPACITY
        }
        Some(requested) => requested,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chordchain_engine::ChainAction;

    fn dashboard() -> Dashboard {
        Dashboard::new(&UserPreferences::ephemeral())
    }

    fn escape() -> KeyPress {
        KeyPress::plain("Escape")
    }

    #[tokio::test]
    async fn escape_closes_the_topmost_region_first() {
        let dashboard = dashboard();
        dashboard.open_regions(&[Region::Modal, Region::AccountMenu, Region::Navigation]);

        let (first, _) = dashboard.handle_key(&escape()).await;
        assert_eq!(first.final_action, ChainAction::Stop);
        assert!(!dashboard.state().is_open(Region::Modal));
        assert!(dashboard.state().is_open(Region::AccountMenu));

        dashboard.handle_key(&escape()).await;
        assert!(!dashboard.state().is_open(Region::AccountMenu));
        assert!(dashboard.state().is_open(Region::Navigation));

        dashboard.handle_key(&escape()).await;
        assert!(dashboard.state().open_regions().is_empty());

        let (last, _) = dashboard.handle_key(&escape()).await;
        assert_eq!(last.visited_providers(), vec![DEBUG_OVERLAY_ID, SURVEY_PAGE_ID]);
        assert!(!last.default_prevented);
        assert_eq!(dashboard.state().status(), "Nothing to close");
    }

    #[tokio::test]
    async fn quit_is_a_host_default_the_dialog_can_prevent() {
        let dashboard = dashboard();
        dashboard.open_regions(&[Region::Modal]);
        let (result, action) = dashboard.handle_key(&KeyPress::plain("q")).await;
        assert!(result.default_prevented);
        assert_eq!(action, HostAction::None);
        assert!(!dashboard.state().quit_requested());

        dashboard.handle_key(&escape()).await;
        let (result, action) = dashboard.handle_key(&KeyPress::plain("q")).await;
        assert!(!result.executed);
        assert_eq!(action, HostAction::Quit);
        assert!(dashboard.state().quit_requested());
    }

    #[tokio::test]
    async fn enter_opens_dialog_then_submits() {
        let dashboard = dashboard();
        dashboard.handle_key(&KeyPress::plain("ArrowDown")).await;
        dashboard.handle_key(&KeyPress::plain("Enter")).await;
        assert!(dashboard.state().is_open(Region::Modal));
        assert_eq!(dashboard.state().status(), "Reviewing Quarterly product pulse");

        let (result, _) = dashboard.handle_key(&KeyPress::plain("Enter")).await;
        assert_eq!(result.visited_providers(), vec![MODAL_DIALOG_ID]);
        assert!(!dashboard.state().is_open(Region::Modal));
        assert_eq!(dashboard.state().status(), "Response submitted for Quarterly product pulse");
    }

    #[tokio::test]
    async fn failing_page_handler_is_recorded_not_fatal() {
        let dashboard = Dashboard::with_state(&UserPreferences::ephemeral(), DashboardState::with_surveys(Vec::new()));
        let (result, _) = dashboard.handle_key(&KeyPress::plain("Enter")).await;
        assert_eq!(result.handlers_executed, 1);
        assert_eq!(result.errors().count(), 1);
        assert_eq!(result.log[0].error.as_deref(), Some("no survey selected"));
        assert!(!dashboard.state().is_open(Region::Modal));

        let (escape, _) = dashboard.handle_key(&escape()).await;
        assert!(escape.errors().next().is_none());
    }

    #[tokio::test]
    async fn disabled_providers_from_preferences_are_skipped() {
        let mut preferences = UserPreferences::ephemeral();
        preferences.set_provider_disabled(MODAL_DIALOG_ID, true).unwrap();
        preferences.set_provider_disabled("not-a-region", true).unwrap();
        let dashboard = Dashboard::new(&preferences);
        dashboard.open_regions(&[Region::Modal, Region::AccountMenu]);

        let (result, _) = dashboard.handle_key(&escape()).await;
        assert!(!result.visited_providers().contains(&MODAL_DIALOG_ID));
        assert!(dashboard.state().is_open(Region::Modal));
        assert!(!dashboard.state().is_open(Region::AccountMenu));

        let info = dashboard.dispatcher().debug_info(&Dashboard::inspected_chord());
        let modal = info.participants.iter().find(|p| p.provider_id == MODAL_DIALOG_ID).unwrap();
        assert!(!modal.enabled);
    }

    #[tokio::test]
    async fn overlay_toggles_and_consumes_escape_while_open() {
        let dashboard = dashboard();
        let (result, _) = dashboard.handle_key(&KeyPress::plain("F12")).await;
        assert!(result.default_prevented);
        assert!(dashboard.state().is_open(Region::Overlay));

        dashboard.open_regions(&[Region::Modal]);
        dashboard.handle_key(&escape()).await;
        assert!(!dashboard.state().is_open(Region::Overlay));
        assert!(dashboard.state().is_open(Region::Modal));
    }

    #[tokio::test]
    async fn chords_from_text_reach_the_same_handlers() {
        let dashboard = dashboard();
        let chord: Chord = "ctrl+b".parse().unwrap();
        dashboard.handle_chord(&chord).await;
        assert!(dashboard.state().is_open(Region::Navigation));
    }

    #[test]
    fn shutdown_unregisters_every_region() {
        let dashboard = dashboard();
        assert_eq!(dashboard.dispatcher().len(), 5);
        dashboard.shutdown();
        assert!(dashboard.dispatcher().is_empty());
    }

    #[test]
    fn journal_capacity_comes_from_preferences() {
        let mut preferences = UserPreferences::ephemeral();
        preferences.set_journal_capacity(Some(2)).unwrap();
        let dashboard = Dashboard::new(&preferences);
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        runtime.block_on(async {
            for _ in 0..4 {
                dashboard.handle_key(&KeyPress::plain("ArrowDown")).await;
            }
        });
        assert_eq!(dashboard.dispatcher().recent_results(10).len(), 2);
    }

    #[test]
    fn oversized_journal_capacity_is_clamped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        std::fs::write(&path, r#"{"journalCapacity":18446744073709551615}"#).unwrap();
        let preferences = UserPreferences::load_from(&path).unwrap();
        assert_eq!(preferences.journal_capacity(), Some(usize::MAX));

        let dashboard = Dashboard::new(&preferences);
        assert_eq!(journal_capacity(&preferences), MAX_JOURNAL_CAPACITY);
        assert_eq!(dashboard.dispatcher().len(), 5);
    }

    #[tokio::test]
    async fn escape_result_serializes_in_camel_case() {
        let dashboard = dashboard();
        dashboard.open_regions(&[Region::Modal]);
        let (result, _) = dashboard.handle_key(&escape()).await;

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["chord"], "Escape");
        assert_eq!(json["handlersExecuted"], 2);
        assert_eq!(json["finalAction"], "stop");
        assert_eq!(json["defaultPrevented"], true);
        assert_eq!(json["log"][0]["providerId"], DEBUG_OVERLAY_ID);
        assert_eq!(json["log"][0]["action"], "continue");
        assert_eq!(json["log"][1]["providerId"], MODAL_DIALOG_ID);
        assert!(json["log"][1].get("error").is_none());
    }
}
