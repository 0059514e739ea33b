//! Dashboard regions registered as shortcut providers.
//!
//! Each region only knows about its own slice of [`DashboardState`]. Overlapping
//! chords (Escape above all) are resolved by priority: the topmost open region
//! handles the key and stops the chain, lower regions see it only when nothing
//! above them claimed it.

use std::rc::Rc;

use anyhow::bail;
use chordchain_engine::{Chord, ExecutionContext, Modifiers, RegionProvider};

use super::state::{DashboardState, Region};

pub const DEBUG_OVERLAY_ID: &str = "debug-overlay";
pub const MODAL_DIALOG_ID: &str = "modal-dialog";
pub const ACCOUNT_MENU_ID: &str = "account-menu";
pub const NAV_PANEL_ID: &str = "nav-panel";
pub const SURVEY_PAGE_ID: &str = "survey-page";

pub const DEBUG_OVERLAY_PRIORITY: i32 = 2000;
pub const MODAL_DIALOG_PRIORITY: i32 = 1000;
pub const ACCOUNT_MENU_PRIORITY: i32 = 700;
pub const NAV_PANEL_PRIORITY: i32 = 600;
pub const SURVEY_PAGE_PRIORITY: i32 = 100;

fn key(name: &str) -> Chord {
    Chord::plain(name)
}

fn ctrl(name: &str) -> Chord {
    Chord::from_parts(Modifiers::ctrl(), name)
}

/// Diagnostic overlay. Always participates; closes itself on Escape only while open.
pub fn debug_overlay(state: &Rc<DashboardState>) -> RegionProvider {
    let toggle_state = Rc::clone(state);
    let escape_state = Rc::clone(state);
    RegionProvider::builder(DEBUG_OVERLAY_ID)
        .priority(DEBUG_OVERLAY_PRIORITY)
        .on(key("F12"), "Toggle shortcut diagnostics", move |ctx| {
            let open = toggle_state.toggle(Region::Overlay);
            toggle_state.set_status(if open { "Diagnostics shown" } else { "Diagnostics hidden" });
            ctx.prevent_default();
            ctx.break_chain();
            Ok(())
        })
        .on(key("Escape"), "Hide diagnostics", move |ctx| {
            if escape_state.is_open(Region::Overlay) {
                escape_state.set_open(Region::Overlay, false);
                ctx.prevent_default();
                ctx.break_chain();
            } else {
                ctx.next();
            }
            Ok(())
        })
        .build()
}

/// Confirmation dialog for the selected survey. Traps focus while open.
pub fn modal_dialog(state: &Rc<DashboardState>) -> RegionProvider {
    let participating = Rc::clone(state);
    let escape_state = Rc::clone(state);
    let confirm_state = Rc::clone(state);
    RegionProvider::builder(MODAL_DIALOG_ID)
        .priority(MODAL_DIALOG_PRIORITY)
        .participating_when(move || participating.is_open(Region::Modal))
        .on(key("Escape"), "Dismiss dialog", move |ctx| {
            escape_state.set_open(Region::Modal, false);
            escape_state.set_status("Dialog dismissed");
            ctx.prevent_default();
            ctx.break_chain();
            Ok(())
        })
        .on(key("Enter"), "Submit response", move |ctx| {
            let title = confirm_state.selected_survey().map(|survey| survey.title);
            confirm_state.set_open(Region::Modal, false);
            match title {
                Some(title) => confirm_state.set_status(format!("Response submitted for {title}")),
                None => confirm_state.set_status("Nothing to submit"),
            }
            ctx.prevent_default();
            ctx.break_chain();
            Ok(())
        })
        .on(key("Tab"), "Keep focus in dialog", trap_focus)
        .on(Chord::from_parts(Modifiers::shift(), "Tab"), "Keep focus in dialog", trap_focus)
        .on(key("q"), "Swallow quit while dialog is open", trap_focus)
        .build()
}

fn trap_focus(ctx: &mut ExecutionContext<'_>) -> anyhow::Result<()> {
    ctx.prevent_default();
    ctx.break_chain();
    Ok(())
}

/// Account dropdown in the header.
pub fn account_menu(state: &Rc<DashboardState>) -> RegionProvider {
    let participating = Rc::clone(state);
    let escape_state = Rc::clone(state);
    let up_state = Rc::clone(state);
    let down_state = Rc::clone(state);
    let enter_state = Rc::clone(state);
    RegionProvider::builder(ACCOUNT_MENU_ID)
        .priority(ACCOUNT_MENU_PRIORITY)
        .participating_when(move || participating.is_open(Region::AccountMenu))
        .on(key("Escape"), "Close account menu", move |ctx| {
            escape_state.set_open(Region::AccountMenu, false);
            escape_state.set_status("Account menu closed");
            ctx.prevent_default();
            ctx.break_chain();
            Ok(())
        })
        .on(key("ArrowUp"), "Previous menu item", move |ctx| {
            up_state.move_menu(false);
            ctx.break_chain();
            Ok(())
        })
        .on(key("ArrowDown"), "Next menu item", move |ctx| {
            down_state.move_menu(true);
            ctx.break_chain();
            Ok(())
        })
        .on(key("Enter"), "Activate menu item", move |ctx| {
            let item = enter_state.menu_item();
            enter_state.set_open(Region::AccountMenu, false);
            enter_state.set_status(format!("Selected {item}"));
            ctx.break_chain();
            Ok(())
        })
        .build()
}

/// Collapsible navigation panel on the left.
pub fn nav_panel(state: &Rc<DashboardState>) -> RegionProvider {
    let participating = Rc::clone(state);
    let escape_state = Rc::clone(state);
    let up_state = Rc::clone(state);
    let down_state = Rc::clone(state);
    RegionProvider::builder(NAV_PANEL_ID)
        .priority(NAV_PANEL_PRIORITY)
        .participating_when(move || participating.is_open(Region::Navigation))
        .on(key("Escape"), "Collapse navigation", move |ctx| {
            escape_state.set_open(Region::Navigation, false);
            escape_state.set_status("Navigation collapsed");
            ctx.prevent_default();
            ctx.break_chain();
            Ok(())
        })
        .on(key("ArrowUp"), "Previous section", move |ctx| {
            up_state.move_nav(false);
            ctx.break_chain();
            Ok(())
        })
        .on(key("ArrowDown"), "Next section", move |ctx| {
            down_state.move_nav(true);
            ctx.break_chain();
            Ok(())
        })
        .build()
}

/// The survey list. Lowest priority, always mounted.
pub fn survey_page(state: &Rc<DashboardState>) -> RegionProvider {
    let up_state = Rc::clone(state);
    let down_state = Rc::clone(state);
    let open_state = Rc::clone(state);
    let menu_state = Rc::clone(state);
    let nav_state = Rc::clone(state);
    let escape_state = Rc::clone(state);
    RegionProvider::builder(SURVEY_PAGE_ID)
        .priority(SURVEY_PAGE_PRIORITY)
        .on(key("ArrowUp"), "Previous survey", move |_| {
            up_state.move_survey(false);
            Ok(())
        })
        .on(key("ArrowDown"), "Next survey", move |_| {
            down_state.move_survey(true);
            Ok(())
        })
        .on(key("Enter"), "Open survey dialog", move |ctx| {
            let Some(survey) = open_state.selected_survey() else {
                bail!("no survey selected");
            };
            let title = survey.title;
            open_state.set_open(Region::Modal, true);
            open_state.set_status(format!("Reviewing {title}"));
            ctx.break_chain();
            Ok(())
        })
        .on(key("m"), "Toggle account menu", move |ctx| {
            menu_state.toggle(Region::AccountMenu);
            ctx.prevent_default();
            Ok(())
        })
        .on(ctrl("b"), "Toggle navigation", move |ctx| {
            nav_state.toggle(Region::Navigation);
            ctx.prevent_default();
            Ok(())
        })
        .on(key("Escape"), "Nothing left to close", move |_| {
            escape_state.set_status("Nothing to close");
            Ok(())
        })
        .build()
}
