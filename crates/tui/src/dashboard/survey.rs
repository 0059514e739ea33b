//! Mock survey data shown on the dashboard page.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Survey {
    pub title: &'static str,
    pub responses: u32,
    /// Completion rate, 0..=100.
    pub completion: u8,
}

impl Survey {
    pub const fn new(title: &'static str, responses: u32, completion: u8) -> Self {
        Self {
            title,
            responses,
            completion,
        }
    }
}

pub fn mock_surveys() -> Vec<Survey> {
    vec![
        Survey::new("Onboarding experience", 214, 87),
        Survey::new("Quarterly product pulse", 1_032, 64),
        Survey::new("Support satisfaction", 389, 92),
        Survey::new("Feature request triage", 57, 31),
        Survey::new("Team retrospective", 18, 100),
    ]
}

pub const NAV_ITEMS: [&str; 3] = ["Overview", "Surveys", "Reports"];
pub const ACCOUNT_MENU_ITEMS: [&str; 3] = ["Profile", "Settings", "Sign out"];
