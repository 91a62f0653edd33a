use crate::config::{ApiBackend, ClientConfig};
use crate::error::{PokedexError, PokedexResult};
use crate::logger::LogLevel;
use std::path::PathBuf;
use url::Url;

/// Builder for constructing ClientConfig instances with a fluent API
///
/// # Example
/// ```
/// use pokedex_lib::config::ApiBackend;
/// use pokedex_lib::config_builder::ClientConfigBuilder;
///
/// let config = ClientConfigBuilder::new()
///     .api_base_url("http://localhost:5000")
///     .backend(ApiBackend::Mock)
///     .in_memory_preferences()
///     .build()
///     .unwrap();
/// assert!(config.preferences_path.is_none());
/// ```
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Create a new builder starting from the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration
    pub fn from_config(config: ClientConfig) -> Self {
        Self { config }
    }

    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_base_url = url.into();
        self
    }

    pub fn image_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.image_base_url = url.into();
        self
    }

    pub fn preferences_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.preferences_path = Some(path.into());
        self
    }

    /// Keep preferences for this process only
    pub fn in_memory_preferences(mut self) -> Self {
        self.config.preferences_path = None;
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs;
        self
    }

    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.config.log_level = level;
        self
    }

    pub fn backend(mut self, backend: ApiBackend) -> Self {
        self.config.backend = backend;
        self
    }

    /// Build the ClientConfig instance
    ///
    /// # Errors
    /// Returns `PokedexError::BuilderError` if a URL does not parse, the HTTP
    /// backend is given a non-HTTP URL, or the timeout is zero
    pub fn build(self) -> PokedexResult<ClientConfig> {
        let config = self.config;

        let api_url = Url::parse(&config.api_base_url).map_err(|e| {
            PokedexError::BuilderError(format!(
                "invalid api_base_url '{}': {}",
                config.api_base_url, e
            ))
        })?;

        if config.backend == ApiBackend::Http && !matches!(api_url.scheme(), "http" | "https") {
            return Err(PokedexError::BuilderError(format!(
                "api_base_url must be http or https, got '{}'",
                api_url.scheme()
            )));
        }

        // Sprite locators may be relative paths served next to the client
        if config.image_base_url.contains("://") {
            Url::parse(&config.image_base_url).map_err(|e| {
                PokedexError::BuilderError(format!(
                    "invalid image_base_url '{}': {}",
                    config.image_base_url, e
                ))
            })?;
        }

        if config.request_timeout_secs == 0 {
            return Err(PokedexError::BuilderError(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }

        Ok(config)
    }
}
