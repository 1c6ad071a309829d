//! TOML Configuration File Support
//!
//! Centralized configuration loading for the reveal controller and the
//! search backend client, from `~/.config/deepsearch/reveal.toml`.
//!
//! # Configuration Priority
//!
//! Configuration values are loaded with the following priority (highest first):
//! 1. CLI arguments (via [`ConfigOverrides`])
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Default values
//!
//! # Example Configuration
//!
//! ```toml
//! [reveal]
//! char_delay_ms = 10
//! list_item_char_delay_ms = 30
//! search_complete_text = "Search complete"
//!
//! [api]
//! base_url = "http://localhost:8001"
//! request_timeout_secs = 120
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default delay between characters of prose stages
pub const DEFAULT_CHAR_DELAY: Duration = Duration::from_millis(10);

/// Default delay between characters of list items
pub const DEFAULT_LIST_ITEM_CHAR_DELAY: Duration = Duration::from_millis(30);

/// Default text of the search-complete marker stage
pub const DEFAULT_SEARCH_COMPLETE_TEXT: &str = "Search complete";

/// Default search backend address
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8001";

/// Default timeout for one search request
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Tracks where a configuration value came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// `[reveal]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealToml {
    /// Per-character delay for prose stages, in milliseconds
    pub char_delay_ms: Option<u64>,

    /// Per-character delay for list items, in milliseconds
    pub list_item_char_delay_ms: Option<u64>,

    /// Text of the search-complete marker stage
    pub search_complete_text: Option<String>,
}

/// `[api]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiToml {
    /// Base URL of the search backend
    pub base_url: Option<String>,

    /// Request timeout in seconds
    pub request_timeout_secs: Option<u64>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealConfigToml {
    /// Reveal cadence section
    pub reveal: RevealToml,

    /// Search backend section
    pub api: ApiToml,
}

// =============================================================================
// Runtime Configuration
// =============================================================================

/// Cadence and literals used by the reveal controller
///
/// The two delays are independent: list items default to a slower pace than
/// prose, and neither is derived from the other.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RevealSettings {
    /// Delay between characters of single-text stages
    pub char_delay: Duration,
    /// Delay between characters of each list item
    pub list_item_char_delay: Duration,
    /// Text revealed by the search-complete stage
    pub search_complete_text: String,
}

impl Default for RevealSettings {
    fn default() -> Self {
        Self {
            char_delay: DEFAULT_CHAR_DELAY,
            list_item_char_delay: DEFAULT_LIST_ITEM_CHAR_DELAY,
            search_complete_text: DEFAULT_SEARCH_COMPLETE_TEXT.to_string(),
        }
    }
}

impl RevealSettings {
    /// Set the prose delay
    #[must_use]
    pub fn with_char_delay(mut self, delay: Duration) -> Self {
        self.char_delay = delay;
        self
    }

    /// Set the list item delay
    #[must_use]
    pub fn with_list_item_char_delay(mut self, delay: Duration) -> Self {
        self.list_item_char_delay = delay;
        self
    }

    /// Set the search-complete text
    #[must_use]
    pub fn with_search_complete_text(mut self, text: impl Into<String>) -> Self {
        self.search_complete_text = text.into();
        self
    }
}

/// Centralized configuration
///
/// Use [`load_config`] to load with proper priority handling.
#[derive(Clone, Debug)]
pub struct RevealConfig {
    /// Reveal cadence
    pub reveal: RevealSettings,

    /// Base URL of the search backend
    pub api_base_url: String,

    /// Timeout for a single backend request
    pub request_timeout: Duration,

    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,

    /// Source of configuration values
    source: ConfigSource,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            reveal: RevealSettings::default(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl RevealConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the primary source of this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Set the configuration source
    pub fn set_source(&mut self, source: ConfigSource) {
        self.source = source;
    }

    /// Check values that would make the reveal or the client unusable
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] for a zero delay, a zero
    /// timeout, or a base URL that is not http(s).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reveal.char_delay.is_zero() {
            return Err(ConfigError::ValidationError(
                "char_delay_ms must be greater than 0".to_string(),
            ));
        }
        if self.reveal.list_item_char_delay.is_zero() {
            return Err(ConfigError::ValidationError(
                "list_item_char_delay_ms must be greater than 0".to_string(),
            ));
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::ValidationError(
                "request_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if !(self.api_base_url.starts_with("http://") || self.api_base_url.starts_with("https://"))
        {
            return Err(ConfigError::ValidationError(format!(
                "api base_url must start with http:// or https://, got {:?}",
                self.api_base_url
            )));
        }
        Ok(())
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/deepsearch/reveal.toml` or
/// `~/.config/deepsearch/reveal.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("deepsearch").join("reveal.toml"))
}

/// Load configuration from all sources with proper priority
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed.
/// A missing config file is not an error (defaults are used).
pub fn load_config() -> Result<RevealConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<RevealConfig, ConfigError> {
    let mut config = RevealConfig::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: RevealConfigToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config);
            config.config_file_path = Some(config_path.clone());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    apply_env_config(&mut config);

    Ok(config)
}

fn apply_toml_config(config: &mut RevealConfig, toml: &RevealConfigToml) {
    if let Some(ms) = toml.reveal.char_delay_ms {
        config.reveal.char_delay = Duration::from_millis(ms);
    }
    if let Some(ms) = toml.reveal.list_item_char_delay_ms {
        config.reveal.list_item_char_delay = Duration::from_millis(ms);
    }
    if let Some(ref text) = toml.reveal.search_complete_text {
        config.reveal.search_complete_text = text.clone();
    }

    if let Some(ref url) = toml.api.base_url {
        config.api_base_url = url.trim_end_matches('/').to_string();
    }
    if let Some(secs) = toml.api.request_timeout_secs {
        config.request_timeout = Duration::from_secs(secs);
    }
}

fn apply_env_config(config: &mut RevealConfig) {
    if let Ok(delay) = std::env::var("DEEPSEARCH_CHAR_DELAY_MS") {
        if let Ok(ms) = delay.parse::<u64>() {
            config.reveal.char_delay = Duration::from_millis(ms);
            config.source = ConfigSource::Env;
        }
    }
    if let Ok(delay) = std::env::var("DEEPSEARCH_LIST_DELAY_MS") {
        if let Ok(ms) = delay.parse::<u64>() {
            config.reveal.list_item_char_delay = Duration::from_millis(ms);
            config.source = ConfigSource::Env;
        }
    }
    if let Ok(url) = std::env::var("DEEPSEARCH_API_URL") {
        config.api_base_url = url.trim_end_matches('/').to_string();
        config.source = ConfigSource::Env;
    }
    if let Ok(timeout) = std::env::var("DEEPSEARCH_REQUEST_TIMEOUT") {
        if let Ok(secs) = timeout.parse::<u64>() {
            config.request_timeout = Duration::from_secs(secs);
            config.source = ConfigSource::Env;
        }
    }
}

// =============================================================================
// CLI Override Support
// =============================================================================

/// Builder for applying CLI overrides to configuration
///
/// Use this after [`load_config`] to apply command-line argument overrides.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Prose delay override (milliseconds)
    pub char_delay_ms: Option<u64>,

    /// List item delay override (milliseconds)
    pub list_item_char_delay_ms: Option<u64>,

    /// Backend URL override
    pub api_base_url: Option<String>,
}

impl ConfigOverrides {
    /// Create a new empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set prose delay override
    #[must_use]
    pub fn with_char_delay_ms(mut self, ms: u64) -> Self {
        self.char_delay_ms = Some(ms);
        self
    }

    /// Set list item delay override
    #[must_use]
    pub fn with_list_item_char_delay_ms(mut self, ms: u64) -> Self {
        self.list_item_char_delay_ms = Some(ms);
        self
    }

    /// Set backend URL override
    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    /// Apply overrides to a configuration
    pub fn apply(&self, config: &mut RevealConfig) {
        if self.char_delay_ms.is_some()
            || self.list_item_char_delay_ms.is_some()
            || self.api_base_url.is_some()
        {
            config.source = ConfigSource::Cli;
        }

        if let Some(ms) = self.char_delay_ms {
            config.reveal.char_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = self.list_item_char_delay_ms {
            config.reveal.list_item_char_delay = Duration::from_millis(ms);
        }
        if let Some(ref url) = self.api_base_url {
            config.api_base_url = url.trim_end_matches('/').to_string();
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
