//! Shared, single-threaded dashboard state mutated by region handlers.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::str::FromStr;

use anyhow::{Error, bail};

use super::survey::{ACCOUNT_MENU_ITEMS, NAV_ITEMS, Survey, mock_surveys};

/// Regions that can be opened or closed on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    Modal,
    Navigation,
    AccountMenu,
    Overlay,
}

impl Region {
    pub const ALL: [Region; 4] = [Region::Modal, Region::Navigation, Region::AccountMenu, Region::Overlay];

    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Modal => "modal",
            Region::Navigation => "nav",
            Region::AccountMenu => "menu",
            Region::Overlay => "overlay",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "modal" | "dialog" => Ok(Region::Modal),
            "nav" | "navigation" => Ok(Region::Navigation),
            "menu" | "account" => Ok(Region::AccountMenu),
            "overlay" | "debug" => Ok(Region::Overlay),
            other => bail!("unknown region '{other}' (expected modal, nav, menu or overlay)"),
        }
    }
}

/// UI state shared between the renderer and the region providers.
#[derive(Debug)]
pub struct DashboardState {
    modal_open: Cell<bool>,
    nav_open: Cell<bool>,
    menu_open: Cell<bool>,
    overlay_open: Cell<bool>,
    quit_requested: Cell<bool>,
    survey_index: Cell<usize>,
    nav_index: Cell<usize>,
    menu_index: Cell<usize>,
    status: RefCell<String>,
    surveys: Vec<Survey>,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::with_surveys(mock_surveys())
    }
}

impl DashboardState {
    pub fn with_surveys(surveys: Vec<Survey>) -> Self {
        Self {
            modal_open: Cell::new(false),
            nav_open: Cell::new(false),
            menu_open: Cell::new(false),
            overlay_open: Cell::new(false),
            quit_requested: Cell::new(false),
            survey_index: Cell::new(0),
            nav_index: Cell::new(1),
            menu_index: Cell::new(0),
            status: RefCell::new(String::from("Ready")),
            surveys,
        }
    }

    fn flag(&self, region: Region) -> &Cell<bool> {
        match region {
            Region::Modal => &self.modal_open,
            Region::Navigation => &self.nav_open,
            Region::AccountMenu => &self.menu_open,
            Region::Overlay => &self.overlay_open,
        }
    }

    pub fn is_open(&self, region: Region) -> bool {
        self.flag(region).get()
    }

    pub fn set_open(&self, region: Region, open: bool) {
        self.flag(region).set(open);
    }

    pub fn toggle(&self, region: Region) -> bool {
        let open = !self.is_open(region);
        self.set_open(region, open);
        open
    }

    pub fn open_regions(&self) -> Vec<Region> {
        Region::ALL.into_iter().filter(|region| self.is_open(*region)).collect()
    }

    pub fn request_quit(&self) {
        self.quit_requested.set(true);
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested.get()
    }

    pub fn status(&self) -> String {
        self.status.borrow().clone()
    }

    pub fn set_status(&self, status: impl Into<String>) {
        *self.status.borrow_mut() = status.into();
    }

    pub fn surveys(&self) -> &[Survey] {
        &self.surveys
    }

    pub fn selected_survey(&self) -> Option<&Survey> {
        self.surveys.get(self.survey_index.get())
    }

    pub fn survey_index(&self) -> usize {
        self.survey_index.get()
    }

    pub fn move_survey(&self, forward: bool) {
        step(&self.survey_index, self.surveys.len(), forward);
    }

    pub fn nav_index(&self) -> usize {
        self.nav_index.get()
    }

    pub fn nav_item(&self) -> &'static str {
        NAV_ITEMS[self.nav_index.get() % NAV_ITEMS.len()]
    }

    pub fn move_nav(&self, forward: bool) {
        step(&self.nav_index, NAV_ITEMS.len(), forward);
    }

    pub fn menu_index(&self) -> usize {
        self.menu_index.get()
    }

    pub fn menu_item(&self) -> &'static str {
        ACCOUNT_MENU_ITEMS[self.menu_index.get() % ACCOUNT_MENU_ITEMS.len()]
    }

    pub fn move_menu(&self, forward: bool) {
        step(&self.menu_index, ACCOUNT_MENU_ITEMS.len(), forward);
    }
}

/// Moves a cyclic cursor one step, wrapping at both ends.
fn step(index: &Cell<usize>, len: usize, forward: bool) {
    if len == 0 {
        return;
    }
    let current = index.get().min(len - 1);
    let next = if forward { (current + 1) % len } else { (current + len - 1) % len };
    index.set(next);
}
