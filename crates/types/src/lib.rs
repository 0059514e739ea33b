//! Shared data types for the Chordchain shortcut dispatch core.
//!
//! These types are produced by the dispatcher and consumed by callers that do
//! not need the engine itself: the diagnostic overlay, the CLI JSON output,
//! and tests asserting on dispatch outcomes. Everything here is plain data and
//! serializes with camelCase field names.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What the chain should do after a handler returns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainAction {
    /// Hand the key press to the next handler in the chain.
    #[default]
    Continue,
    /// End the chain after the current handler.
    Stop,
}

impl ChainAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChainAction::Continue => "continue",
            ChainAction::Stop => "stop",
        }
    }

    pub fn is_stop(&self) -> bool {
        matches!(self, ChainAction::Stop)
    }
}

impl fmt::Display for ChainAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a single chain position.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainLogEntry {
    /// Provider that owned the handler at this position.
    pub provider_id: String,
    /// `true` when the handler body returned normally.
    pub executed: bool,
    /// Action recorded for this position.
    pub action: ChainAction,
    /// Failure message when the handler faulted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ChainLogEntry {
    pub fn completed(provider_id: impl Into<String>, action: ChainAction) -> Self {
        Self {
            provider_id: provider_id.into(),
            executed: true,
            action,
            error: None,
        }
    }

    pub fn failed(provider_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            provider_id: provider_id.into(),
            executed: false,
            action: ChainAction::Continue,
            error: Some(message.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Aggregate produced once per dispatch.
///
/// `handlers_executed` counts every chain position that was visited,
/// including positions whose handler faulted. `total_handlers` is the length
/// of the enabled chain built for the dispatch.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainExecutionResult {
    /// Chord the dispatch was issued for.
    pub chord: String,
    pub executed: bool,
    pub handlers_executed: usize,
    pub total_handlers: usize,
    /// Action of the last visited position; `continue` when nothing ran.
    pub final_action: ChainAction,
    pub default_prevented: bool,
    pub propagation_stopped: bool,
    pub log: Vec<ChainLogEntry>,
}

impl ChainExecutionResult {
    /// Result for a chord nobody handled.
    pub fn empty(chord: impl Into<String>) -> Self {
        Self {
            chord: chord.into(),
            ..Self::default()
        }
    }

    /// Log entries whose handler faulted.
    pub fn errors(&self) -> impl Iterator<Item = &ChainLogEntry> {
        self.log.iter().filter(|entry| entry.is_error())
    }

    /// Provider ids in the order they were visited.
    pub fn visited_providers(&self) -> Vec<&str> {
        self.log.iter().map(|entry| entry.provider_id.as_str()).collect()
    }
}

/// One chain participant as reported by debug introspection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantInfo {
    pub provider_id: String,
    pub enabled: bool,
    pub priority: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Live view of who would take part in a dispatch for a chord.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainDebugInfo {
    pub chord: String,
    /// Participants in the order dispatch would visit them, disabled ones included.
    pub participants: Vec<ParticipantInfo>,
    pub total: usize,
}

impl ChainDebugInfo {
    /// Number of participants whose handler is currently enabled.
    pub fn enabled_count(&self) -> usize {
        self.participants.iter().filter(|participant| participant.enabled).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_action_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&ChainAction::Stop).unwrap(), "\"stop\"");
        assert_eq!(serde_json::to_string(&ChainAction::Continue).unwrap(), "\"continue\"");
        assert_eq!(ChainAction::default(), ChainAction::Continue);
    }

    #[test]
    fn empty_result_matches_unhandled_shape() {
        let result = ChainExecutionResult::empty("Escape");
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["executed"], false);
        assert_eq!(value["handlersExecuted"], 0);
        assert_eq!(value["totalHandlers"], 0);
        assert_eq!(value["finalAction"], "continue");
        assert!(value["log"].as_array().unwrap().is_empty());
    }

    #[test]
    fn failed_entry_keeps_message_and_omits_it_when_clean() {
        let failed = ChainLogEntry::failed("modal", "boom");
        assert!(failed.is_error());
        assert!(!failed.executed);

        let clean = serde_json::to_value(ChainLogEntry::completed("menu", ChainAction::Stop)).unwrap();
        assert!(clean.get("error").is_none());
        assert_eq!(clean["providerId"], "menu");
    }

    #[test]
    fn debug_info_counts_enabled_participants() {
        let info = ChainDebugInfo {
            chord: "Escape".into(),
            participants: vec![
                ParticipantInfo {
                    provider_id: "a".into(),
                    enabled: true,
                    priority: 10,
                    description: None,
                },
                ParticipantInfo {
                    provider_id: "b".into(),
                    enabled: false,
                    priority: 5,
                    description: Some("close".into()),
                },
            ],
            total: 2,
        };
        assert_eq!(info.enabled_count(), 1);
    }
}
