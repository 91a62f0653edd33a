use crate::error::{PokedexError, PokedexResult};
use crate::logger::LogLevel;
use crate::models::DEFAULT_IMAGE_BASE_URL;
use crate::repository::factory::DEFAULT_STORE_PATH;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_API_URL: &str = "POKEDEX_API_URL";
pub const ENV_PREFERENCES: &str = "POKEDEX_PREFERENCES";
pub const ENV_LOG_LEVEL: &str = "POKEDEX_LOG_LEVEL";

/// Client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Remote catalog service root, e.g. `http://localhost:5000`
    pub api_base_url: String,

    /// Prefix for sprite locators
    pub image_base_url: String,

    /// Preference store file; `None` keeps preferences in memory only
    pub preferences_path: Option<PathBuf>,

    /// Per-request timeout for the remote service
    pub request_timeout_secs: u64,

    pub log_level: LogLevel,

    /// Which remote service implementation to talk to
    pub backend: ApiBackend,
}

/// Remote service implementation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ApiBackend {
    /// Real HTTP service
    #[default]
    Http,

    /// In-process emulation seeded with a small dataset (no network)
    Mock,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:5000".to_string(),
            image_base_url: DEFAULT_IMAGE_BASE_URL.to_string(),
            preferences_path: Some(PathBuf::from(DEFAULT_STORE_PATH)),
            request_timeout_secs: 10,
            log_level: LogLevel::Info,
            backend: ApiBackend::Http,
        }
    }
}

impl ClientConfig {
    /// Load configuration from a JSON file. A missing file yields defaults.
    pub fn load(path: impl AsRef<Path>) -> PokedexResult<Self> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents).map_err(|e| {
                PokedexError::ConfigError(format!("{}: {}", path.display(), e))
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Apply `POKEDEX_*` environment overrides
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup (environment in production)
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            self.api_base_url = url.trim().to_string();
        }
        if let Some(path) = lookup(ENV_PREFERENCES) {
            self.preferences_path = if path.trim().is_empty() {
                None
            } else {
                Some(PathBuf::from(path))
            };
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL).and_then(|v| LogLevel::from_str(&v)) {
            self.log_level = level;
        }
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
