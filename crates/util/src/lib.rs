pub mod logging;
pub mod path_processing;
pub mod preferences;

pub use logging::{LOG_PATH_ENV, LogTarget, default_log_path, init_tracing, resolve_filter};
pub use path_processing::{APP_DIR_NAME, config_file_path, expand_tilde};
pub use preferences::{PREFERENCES_PATH_ENV, PreferencesError, PreferencesPayload, UserPreferences, default_preferences_path};
