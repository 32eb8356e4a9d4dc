//! Shield Configuration
//!
//! Loaded from an optional JSON file, then environment overrides.
//! Bad or missing files fall back to defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{
    self, DEFAULT_EXCERPT_MAX_CHARS, DEFAULT_QUERY_LIMIT, DEFAULT_STREAM_THREAT_LABEL,
    DEFAULT_WAKE_COALESCE_MS,
};
use crate::logic::error::ConfigError;

// ============================================================================
// CONFIG
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShieldConfig {
    /// Limit applied when a query omits one
    pub default_query_limit: usize,
    /// Alert excerpt length in characters
    pub excerpt_max_chars: usize,
    /// Threat label for fraud caught on the live stream
    pub stream_threat_label: String,
    /// Window in which repeated wake requests collapse into one
    pub wake_coalesce_ms: u64,
    /// SQLite inbox location (None = platform data dir)
    pub inbox_db_path: Option<PathBuf>,
    /// Permission state reported by the demo binary
    pub permissions_granted: bool,
    pub log_level: String,
}

impl Default for ShieldConfig {
    fn default() -> Self {
        Self {
            default_query_limit: DEFAULT_QUERY_LIMIT,
            excerpt_max_chars: DEFAULT_EXCERPT_MAX_CHARS,
            stream_threat_label: DEFAULT_STREAM_THREAT_LABEL.to_string(),
            wake_coalesce_ms: DEFAULT_WAKE_COALESCE_MS,
            inbox_db_path: None,
            permissions_granted: true,
            log_level: "info".to_string(),
        }
    }
}

impl ShieldConfig {
    /// Load config: file (if given and readable), then env overrides.
    /// A bad file is logged and replaced by defaults.
    pub fn load(path: Option<&Path>) -> Self {
        let (config, problem) = Self::load_checked(path);
        if let Some(e) = problem {
            log::warn!("{}, using defaults", e);
        }
        config
    }

    /// Like `load`, but hands a file problem back instead of logging it, for
    /// callers whose logger depends on the loaded config.
    pub fn load_checked(path: Option<&Path>) -> (Self, Option<ConfigError>) {
        let (mut config, problem) = match path.map(Self::from_file) {
            None => (Self::default(), None),
            Some(Ok(config)) => (config, None),
            Some(Err(e)) => (Self::default(), Some(e)),
        };
        config.apply_env();
        (config, problem)
    }

    /// Path named by `MOMOSHIELD_CONFIG`, if any
    pub fn path_from_env() -> Option<PathBuf> {
        constants::env_string(constants::ENV_CONFIG_PATH).map(PathBuf::from)
    }

    /// Missing file means defaults; unreadable or invalid content is an error
    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::info!("Config file {:?} not found, using defaults", path);
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let config = serde_json::from_str::<Self>(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        log::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Some(limit) = constants::env_parse::<usize>(constants::ENV_QUERY_LIMIT) {
            self.default_query_limit = limit;
        }
        if let Some(label) = constants::env_string(constants::ENV_THREAT_LABEL) {
            self.stream_threat_label = label;
        }
        if let Some(ms) = constants::env_parse::<u64>(constants::ENV_WAKE_COALESCE_MS) {
            self.wake_coalesce_ms = ms;
        }
        if let Some(path) = constants::env_string(constants::ENV_INBOX_DB) {
            self.inbox_db_path = Some(PathBuf::from(path));
        }
        if let Some(level) = constants::env_string(constants::ENV_LOG_LEVEL) {
            self.log_level = level;
        }
    }

    /// Resolved inbox path
    pub fn inbox_path(&self) -> PathBuf {
        self.inbox_db_path.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("momo-shield")
                .join("inbox.db")
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================
