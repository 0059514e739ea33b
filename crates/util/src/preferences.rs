//! User preference persistence for the Chordchain dashboard.
//!
//! A small JSON-backed store for settings that shape shortcut dispatch at
//! startup: providers the user switched off, the size of the dispatch
//! journal, and whether the diagnostic overlay opens by default. The file is
//! written to the standard configuration directory
//! (`~/.config/chordchain/preferences.json` on most platforms).

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::path_processing::config_file_path;

/// Environment variable allowing callers to override the preferences file path.
pub const PREFERENCES_PATH_ENV: &str = "CHORDCHAIN_PREFERENCES_PATH";

/// Default filename for the JSON payload.
pub const PREFERENCES_FILE_NAME: &str = "preferences.json";

/// Error surfaced when reading or writing preferences fails.
#[derive(Debug, Error)]
pub enum PreferencesError {
    /// I/O failure (for example, permissions or missing directory).
    #[error("preferences I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization or deserialization failure.
    #[error("preferences serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Persisted preference values.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesPayload {
    /// Provider ids whose handlers are disabled when the dashboard starts.
    #[serde(default)]
    pub disabled_providers: Vec<String>,
    /// Number of dispatch results kept for diagnostics.
    #[serde(default)]
    pub journal_capacity: Option<usize>,
    /// Open the diagnostic overlay on startup.
    #[serde(default)]
    pub show_debug_overlay: bool,
}

/// Preferences store backed by a JSON file.
#[derive(Debug, Default)]
pub struct UserPreferences {
    path: PathBuf,
    payload: PreferencesPayload,
    persist_to_disk: bool,
}

impl UserPreferences {
    /// Loads the store from the default path (or `CHORDCHAIN_PREFERENCES_PATH`).
    pub fn new() -> Result<Self, PreferencesError> {
        Self::load_from(default_preferences_path())
    }

    /// Loads the store from an explicit path. A missing or malformed file
    /// yields defaults.
    pub fn load_from(path: impl Into<PathBuf>) -> Result<Self, PreferencesError> {
        let path = path.into();
        let payload = load_payload(&path)?;
        Ok(Self {
            path,
            payload,
            persist_to_disk: true,
        })
    }

    /// Build an in-memory store used as a fallback when the config directory cannot be accessed.
    pub fn ephemeral() -> Self {
        Self {
            path: PathBuf::new(),
            payload: PreferencesPayload::default(),
            persist_to_disk: false,
        }
    }

    /// Path to the underlying JSON file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn payload(&self) -> &PreferencesPayload {
        &self.payload
    }

    pub fn disabled_providers(&self) -> &[String] {
        &self.payload.disabled_providers
    }

    pub fn is_provider_disabled(&self, provider_id: &str) -> bool {
        self.payload.disabled_providers.iter().any(|id| id == provider_id)
    }

    pub fn journal_capacity(&self) -> Option<usize> {
        self.payload.journal_capacity
    }

    pub fn show_debug_overlay(&self) -> bool {
        self.payload.show_debug_overlay
    }

    /// Records whether a provider starts disabled and persists the change.
    pub fn set_provider_disabled(&mut self, provider_id: &str, disabled: bool) -> Result<(), PreferencesError> {
        let providers = &mut self.payload.disabled_providers;
        let present = providers.iter().any(|id| id == provider_id);
        match (disabled, present) {
            (true, false) => providers.push(provider_id.to_string()),
            (false, true) => providers.retain(|id| id != provider_id),
            _ => return Ok(()),
        }
        self.save()
    }

    pub fn set_show_debug_overlay(&mut self, show: bool) -> Result<(), PreferencesError> {
        if self.payload.show_debug_overlay == show {
            return Ok(());
        }
        self.payload.show_debug_overlay = show;
        self.save()
    }

    pub fn set_journal_capacity(&mut self, capacity: Option<usize>) -> Result<(), PreferencesError> {
        self.payload.journal_capacity = capacity;
        self.save()
    }

    fn save(&self) -> Result<(), PreferencesError> {
        if !self.persist_to_disk {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(&self.payload)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}

/// Resolved location of the preferences file.
pub fn default_preferences_path() -> PathBuf {
    config_file_path(PREFERENCES_PATH_ENV, PREFERENCES_FILE_NAME)
}

fn load_payload(path: &Path) -> Result<PreferencesPayload, PreferencesError> {
    match fs::read_to_string(path) {
        Ok(data) => match serde_json::from_str(&data) {
            Ok(payload) => Ok(payload),
            Err(error) => {
                warn!(
                    path = %path.display(),
                    error = %error,
                    "Failed to parse preferences file; using defaults"
                );
                Ok(PreferencesPayload::default())
            }
        },
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(PreferencesPayload::default()),
        Err(error) => Err(PreferencesError::Io(error)),
    }
}
