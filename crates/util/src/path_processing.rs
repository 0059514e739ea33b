use std::env;
use std::path::PathBuf;

use dirs_next::{config_dir, home_dir};

/// Directory name used under the platform config directory.
pub const APP_DIR_NAME: &str = "chordchain";

/// Expands a leading `~` to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    let p = path.trim();
    if p == "~" {
        return home_dir().unwrap_or_else(|| PathBuf::from("~"));
    }
    if let Some(rest) = p.strip_prefix("~/").or_else(|| p.strip_prefix("~\\")) {
        return home_dir().unwrap_or_else(|| PathBuf::from("~")).join(rest);
    }
    PathBuf::from(p)
}

/// Resolves a file under the app config directory, honoring an environment
/// override when `env_var` is set to a non-empty value.
pub fn config_file_path(env_var: &str, file_name: &str) -> PathBuf {
    if let Ok(path) = env::var(env_var) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return expand_tilde(trimmed);
        }
    }

    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
        .join(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_paths_are_untouched() {
        assert_eq!(expand_tilde(" /tmp/prefs.json "), PathBuf::from("/tmp/prefs.json"));
    }

    #[test]
    fn tilde_prefix_expands_to_home() {
        let Some(home) = home_dir() else {
            return;
        };
        assert_eq!(expand_tilde("~"), home);
        assert_eq!(expand_tilde("~/a/b.json"), home.join("a/b.json"));
    }

    #[test]
    fn env_override_wins_over_config_dir() {
        temp_env::with_var("CHORDCHAIN_TEST_PATH", Some("/tmp/override.json"), || {
            assert_eq!(
                config_file_path("CHORDCHAIN_TEST_PATH", "ignored.json"),
                PathBuf::from("/tmp/override.json")
            );
        });
        temp_env::with_var("CHORDCHAIN_TEST_PATH", Some("   "), || {
            let path = config_file_path("CHORDCHAIN_TEST_PATH", "prefs.json");
            assert!(path.ends_with(PathBuf::from(APP_DIR_NAME).join("prefs.json")));
        });
    }
}
