//! Configuration loading and resolution
//!
//! Every setting is resolved in this priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing TOML file is not an error: a warning is logged and the
//! remaining tiers apply. A TOML file that exists but does not parse is.

use crate::{Error, Result};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Compiled default REST base URL
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api/v1";

/// Compiled default request timeout
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Environment variable overriding the REST base URL
pub const ENV_API_URL: &str = "BLUEWAVES_API_URL";

/// Environment variable naming the TOML config file
pub const ENV_CONFIG_PATH: &str = "BLUEWAVES_CONFIG";

/// On-disk configuration, every field optional
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct TomlConfig {
    /// REST base URL, e.g. `http://localhost:8080/api/v1`
    #[serde(default)]
    pub api_base_url: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Default login email
    #[serde(default)]
    pub email: Option<String>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_path: Option<PathBuf>,
    pub api_base_url: Option<String>,
    pub email: Option<String>,
}

/// Fully resolved client configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base URL, always ending in `/` so endpoint paths join beneath it
    pub api_base_url: Url,
    pub request_timeout: Duration,
    pub email: Option<String>,
    pub logging: LoggingConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: Url::parse(&format!("{}/", DEFAULT_API_BASE_URL))
                .expect("compiled default API URL is valid"),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            email: None,
            logging: LoggingConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Build a config pointing at `base_url` with every other field defaulted
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        Ok(Self {
            api_base_url: parse_base_url(base_url)?,
            ..Self::default()
        })
    }

    /// Resolve the configuration from all four tiers
    pub fn resolve(overrides: &ConfigOverrides) -> Result<Self> {
        let toml_config = match config_file_path(overrides.config_path.as_deref()) {
            Some(path) => load_toml_config(&path)?.unwrap_or_default(),
            None => {
                warn!("Could not determine config directory, using defaults");
                TomlConfig::default()
            }
        };

        Self::from_sources(overrides, std::env::var(ENV_API_URL).ok(), toml_config)
    }

    /// Merge already-loaded sources; split out of `resolve` so the priority
    /// order can be exercised without touching the process environment
    pub fn from_sources(
        overrides: &ConfigOverrides,
        env_api_url: Option<String>,
        toml_config: TomlConfig,
    ) -> Result<Self> {
        let raw_url = overrides
            .api_base_url
            .clone()
            .or(env_api_url)
            .or(toml_config.api_base_url)
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

        let timeout_secs = toml_config
            .request_timeout_secs
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(Error::Config(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            api_base_url: parse_base_url(&raw_url)?,
            request_timeout: Duration::from_secs(timeout_secs),
            email: overrides.email.clone().or(toml_config.email),
            logging: toml_config.logging,
        })
    }
}

/// Parse and normalize a REST base URL
///
/// Only absolute http(s) URLs are accepted. A trailing `/` is appended so
/// that `Url::join("users/token")` lands under the API prefix instead of
/// replacing its last segment.
pub fn parse_base_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    let normalized = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{}/", trimmed)
    };

    let url = Url::parse(&normalized)
        .map_err(|e| Error::Config(format!("Invalid API base URL '{}': {}", raw, e)))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(Error::Config(format!(
            "Unsupported API base URL scheme '{}' (expected http or https)",
            other
        ))),
    }
}

/// Locate the TOML file: explicit path, then `BLUEWAVES_CONFIG`, then the
/// platform config directory
pub fn config_file_path(cli_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_path {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(ENV_CONFIG_PATH) {
        return Some(PathBuf::from(path));
    }

    default_config_path()
}

/// `<config dir>/bluewaves/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("bluewaves").join("config.toml"))
}

/// Read a TOML config file; `Ok(None)` when the file does not exist
pub fn load_toml_config(path: &Path) -> Result<Option<TomlConfig>> {
    if !path.exists() {
        warn!(
            "Config file {} not found, using defaults",
            path.display()
        );
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML {} failed: {}", path.display(), e)))?;

    info!("Loaded configuration from {}", path.display());
    Ok(Some(config))
}
