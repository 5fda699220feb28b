//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

/// Default location of the key-value file
pub const DEFAULT_DATA_FILE: &str = "usuarios.json";

/// Default log filter
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// What to do when the stored user collection cannot be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadPolicy {
    /// Start from an empty collection and log a warning
    #[default]
    Discard,
    /// Refuse to open the repository
    Strict,
}

impl LoadPolicy {
    /// `true` selects [`LoadPolicy::Strict`]
    pub fn from_strict(strict: bool) -> Self {
        if strict {
            LoadPolicy::Strict
        } else {
            LoadPolicy::Discard
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Path of the JSON file backing the key-value store
    pub data_file: PathBuf,
    /// Handling of unparsable stored users
    pub load_policy: LoadPolicy,
    /// Log filter used when RUST_LOG is unset
    pub log_level: String,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            data_file: env::var("USUARIOS_DATA_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_FILE)),
            load_policy: LoadPolicy::from_strict(
                env::var("USUARIOS_STRICT_LOAD")
                    .map(|v| parse_flag(&v))
                    .unwrap_or(false),
            ),
            log_level: env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string()),
        }
    }

    /// Override the data file location
    pub fn with_data_file(mut self, data_file: impl Into<PathBuf>) -> Self {
        self.data_file = data_file.into();
        self
    }

    /// Override the load policy
    pub fn with_load_policy(mut self, load_policy: LoadPolicy) -> Self {
        self.load_policy = load_policy;
        self
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            load_policy: LoadPolicy::Discard,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
