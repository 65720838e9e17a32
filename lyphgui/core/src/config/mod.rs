//! TOML Configuration File Support
//!
//! Client configuration is read from `~/.config/lyphgui/client.toml`.
//!
//! # Configuration Priority
//!
//! Highest first:
//! 1. CLI arguments ([`ConfigOverrides`])
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Default values
//!
//! # XDG Base Directory Compliance
//!
//! - `$XDG_CONFIG_HOME/lyphgui/client.toml` (typically `~/.config/lyphgui/client.toml`)
//!
//! # Example Configuration
//!
//! ```toml
//! [server]
//! base_url = "http://localhost:5052"
//! timeout_ms = 30000
//!
//! [client]
//! serialize_per_kind = true
//! channel_capacity = 256
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::backend::ServiceConfig;

/// Environment variable overriding the server base URL
pub const ENV_SERVER: &str = "LYPHGUI_SERVER";
/// Environment variable overriding the request timeout (milliseconds)
pub const ENV_TIMEOUT_MS: &str = "LYPHGUI_TIMEOUT_MS";
/// Environment variable toggling per-kind request serialization
pub const ENV_SERIALIZE_PER_KIND: &str = "LYPHGUI_SERIALIZE_PER_KIND";
/// Environment variable overriding the view channel capacity
pub const ENV_CHANNEL_CAPACITY: &str = "LYPHGUI_CHANNEL_CAPACITY";

/// Default capacity of the view message channel
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

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

// =============================================================================
// Configuration Source Tracking
// =============================================================================

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

/// Server section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerToml {
    /// Base URL of the lyph service
    pub base_url: Option<String>,

    /// Per-request timeout in milliseconds
    pub timeout_ms: Option<u64>,
}

/// Client section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientToml {
    /// Queue same-kind requests while one is in flight
    pub serialize_per_kind: Option<bool>,

    /// Capacity of the view message channel
    pub channel_capacity: Option<usize>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LyphguiToml {
    /// Server section
    pub server: ServerToml,

    /// Client section
    pub client: ClientToml,
}

// =============================================================================
// Main Configuration Struct
// =============================================================================

/// Resolved client configuration
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Lyph service connection settings
    pub service: ServiceConfig,

    /// Whether same-kind requests are dispatched one at a time
    pub serialize_per_kind: bool,

    /// Capacity of the view message channel
    pub channel_capacity: usize,

    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,

    source: ConfigSource,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            service: ServiceConfig::default(),
            serialize_per_kind: true,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl ClientConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the highest-priority source that contributed a value
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Check values that would make the client unusable
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] for an empty base URL, a zero
    /// timeout or a zero channel capacity.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service.base_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "server base_url must not be empty".to_string(),
            ));
        }
        if self.service.timeout.is_zero() {
            return Err(ConfigError::ValidationError(
                "server timeout must be greater than zero".to_string(),
            ));
        }
        if self.channel_capacity == 0 {
            return Err(ConfigError::ValidationError(
                "channel_capacity must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/lyphgui/client.toml` or
/// `~/.config/lyphgui/client.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("lyphgui").join("client.toml"))
}

/// Load configuration from the default path and the process environment
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed.
/// A missing config file is not an error (defaults are used).
pub fn load_config() -> Result<ClientConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path and the process environment
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<ClientConfig, ConfigError> {
    load_config_with_env(path, |key| std::env::var(key).ok())
}

/// Load configuration, reading environment variables through `env`
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed.
pub fn load_config_with_env<F>(path: Option<PathBuf>, env: F) -> Result<ClientConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = ClientConfig::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: LyphguiToml = toml::from_str(&toml_content)?;
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

    apply_env_config(&mut config, env);

    Ok(config)
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut ClientConfig, toml: &LyphguiToml) {
    if let Some(ref url) = toml.server.base_url {
        config.service.base_url = url.clone();
    }
    if let Some(ms) = toml.server.timeout_ms {
        config.service.timeout = Duration::from_millis(ms);
    }
    if let Some(serialize) = toml.client.serialize_per_kind {
        config.serialize_per_kind = serialize;
    }
    if let Some(capacity) = toml.client.channel_capacity {
        config.channel_capacity = capacity;
    }
}

/// Apply environment variable overrides to the config
///
/// Unparseable numeric values are ignored with a warning.
fn apply_env_config<F>(config: &mut ClientConfig, env: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = env(ENV_SERVER) {
        config.service.base_url = url;
        config.source = ConfigSource::Env;
    }
    if let Some(timeout) = env(ENV_TIMEOUT_MS) {
        match timeout.parse::<u64>() {
            Ok(ms) => {
                config.service.timeout = Duration::from_millis(ms);
                config.source = ConfigSource::Env;
            }
            Err(_) => tracing::warn!(var = ENV_TIMEOUT_MS, value = %timeout, "Ignoring invalid value"),
        }
    }
    if let Some(serialize) = env(ENV_SERIALIZE_PER_KIND) {
        config.serialize_per_kind = serialize != "0" && serialize.to_lowercase() != "false";
        config.source = ConfigSource::Env;
    }
    if let Some(capacity) = env(ENV_CHANNEL_CAPACITY) {
        match capacity.parse::<usize>() {
            Ok(n) => {
                config.channel_capacity = n;
                config.source = ConfigSource::Env;
            }
            Err(_) => {
                tracing::warn!(var = ENV_CHANNEL_CAPACITY, value = %capacity, "Ignoring invalid value");
            }
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
    /// Server base URL override
    pub base_url: Option<String>,

    /// Request timeout override (milliseconds)
    pub timeout_ms: Option<u64>,

    /// Per-kind serialization override
    pub serialize_per_kind: Option<bool>,
}

impl ConfigOverrides {
    /// Create a new empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set server base URL override
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set timeout override
    #[must_use]
    pub fn with_timeout_ms(mut self, ms: u64) -> Self {
        self.timeout_ms = Some(ms);
        self
    }

    /// Set per-kind serialization override
    #[must_use]
    pub fn with_serialize_per_kind(mut self, serialize: bool) -> Self {
        self.serialize_per_kind = Some(serialize);
        self
    }

    /// Apply overrides to a configuration
    pub fn apply(&self, config: &mut ClientConfig) {
        if self.base_url.is_some() || self.timeout_ms.is_some() || self.serialize_per_kind.is_some()
        {
            config.source = ConfigSource::Cli;
        }

        if let Some(ref url) = self.base_url {
            config.service.base_url = url.clone();
        }

        if let Some(ms) = self.timeout_ms {
            config.service.timeout = Duration::from_millis(ms);
        }

        if let Some(serialize) = self.serialize_per_kind {
            config.serialize_per_kind = serialize;
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn toml_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    // =========================================================================
    // Default Configuration Tests
    // =========================================================================

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();

        assert_eq!(config.service.base_url, "http://localhost:5052");
        assert_eq!(config.service.timeout, Duration::from_secs(30));
        assert!(config.serialize_per_kind);
        assert_eq!(config.channel_capacity, DEFAULT_CHANNEL_CAPACITY);
        assert_eq!(config.source(), ConfigSource::Default);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_config_path() {
        if let Some(p) = default_config_path() {
            assert!(p.to_string_lossy().contains("lyphgui"));
            assert!(p.to_string_lossy().ends_with("client.toml"));
        }
    }

    // =========================================================================
    // TOML Parsing Tests
    // =========================================================================

    #[test]
    fn test_parse_valid_toml() {
        let file = toml_file(
            r#"
[server]
base_url = "http://lyphs.example:8080"
timeout_ms = 2500

[client]
serialize_per_kind = false
channel_capacity = 16
"#,
        );

        let config = load_config_with_env(Some(file.path().to_path_buf()), no_env).unwrap();

        assert_eq!(config.service.base_url, "http://lyphs.example:8080");
        assert_eq!(config.service.timeout, Duration::from_millis(2500));
        assert!(!config.serialize_per_kind);
        assert_eq!(config.channel_capacity, 16);
        assert_eq!(config.source(), ConfigSource::File);
        assert_eq!(config.config_file_path.as_deref(), Some(file.path()));
    }

    #[test]
    fn test_parse_partial_toml() {
        let file = toml_file("[server]\ntimeout_ms = 750\n");

        let config = load_config_with_env(Some(file.path().to_path_buf()), no_env).unwrap();

        assert_eq!(config.service.timeout, Duration::from_millis(750));
        assert_eq!(config.service.base_url, "http://localhost:5052");
        assert!(config.serialize_per_kind);
    }

    #[test]
    fn test_missing_file_graceful() {
        let path = PathBuf::from("/nonexistent/path/client.toml");
        let config = load_config_with_env(Some(path), no_env).unwrap();

        assert_eq!(config.source(), ConfigSource::Default);
        assert!(config.config_file_path.is_none());
    }

    #[test]
    fn test_malformed_toml_error() {
        let file = toml_file("[server\nbase_url = 12\n");

        let result = load_config_with_env(Some(file.path().to_path_buf()), no_env);
        assert!(matches!(result.unwrap_err(), ConfigError::ParseError(_)));
    }

    // =========================================================================
    // Priority Ordering Tests
    // =========================================================================

    #[test]
    fn test_env_overrides_file() {
        let file = toml_file(
            r#"
[server]
base_url = "http://file-host:1"
timeout_ms = 5000
"#,
        );
        let env: HashMap<&str, &str> = [
            (ENV_SERVER, "http://env-host:2"),
            (ENV_SERIALIZE_PER_KIND, "false"),
        ]
        .into_iter()
        .collect();

        let config = load_config_with_env(Some(file.path().to_path_buf()), |key| {
            env.get(key).map(|v| (*v).to_string())
        })
        .unwrap();

        assert_eq!(config.service.base_url, "http://env-host:2");
        // Not overridden by env
        assert_eq!(config.service.timeout, Duration::from_millis(5000));
        assert!(!config.serialize_per_kind);
        assert_eq!(config.source(), ConfigSource::Env);
    }

    #[test]
    fn test_invalid_env_number_ignored() {
        let config = load_config_with_env(None, |key| {
            (key == ENV_TIMEOUT_MS).then(|| "soon".to_string())
        })
        .unwrap();

        assert_eq!(config.service.timeout, Duration::from_secs(30));
        assert_eq!(config.source(), ConfigSource::Default);
    }

    #[test]
    fn test_cli_overrides_everything() {
        let mut config = load_config_with_env(None, |key| {
            (key == ENV_SERVER).then(|| "http://env-host:2".to_string())
        })
        .unwrap();

        ConfigOverrides::new()
            .with_base_url("http://cli-host:3")
            .with_timeout_ms(100)
            .with_serialize_per_kind(false)
            .apply(&mut config);

        assert_eq!(config.service.base_url, "http://cli-host:3");
        assert_eq!(config.service.timeout, Duration::from_millis(100));
        assert!(!config.serialize_per_kind);
        assert_eq!(config.source(), ConfigSource::Cli);
    }

    #[test]
    fn test_empty_overrides_keep_source() {
        let mut config = ClientConfig::default();
        ConfigOverrides::new().apply(&mut config);
        assert_eq!(config.source(), ConfigSource::Default);
    }

    // =========================================================================
    // Validation Tests
    // =========================================================================

    #[test]
    fn test_validation_rejects_unusable_values() {
        let mut config = ClientConfig::default();
        config.service.base_url = "  ".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));

        let mut config = ClientConfig::default();
        config.service.timeout = Duration::ZERO;
        assert!(config.validate().is_err());

        let mut config = ClientConfig::default();
        config.channel_capacity = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_source_display() {
        assert_eq!(ConfigSource::Cli.to_string(), "CLI");
        assert_eq!(ConfigSource::Env.to_string(), "environment");
        assert_eq!(ConfigSource::File.to_string(), "config file");
        assert_eq!(ConfigSource::Default.to_string(), "default");
    }
}
