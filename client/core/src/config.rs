//! Client Configuration
//!
//! Where the backend lives and how long to wait for it.
//!
//! # Precedence (lowest to highest)
//!
//! 1. Built-in defaults (`http://127.0.0.1:8100`, no timeout)
//! 2. TOML file (`$XDG_CONFIG_HOME/dstl-chat/config.toml` unless overridden)
//! 3. Environment (`DSTL_CHAT_URL`, `DSTL_CHAT_TIMEOUT_SECS`)
//! 4. Explicit overrides (command line)
//!
//! # File Format
//!
//! ```toml
//! [backend]
//! url = "http://127.0.0.1:8100"
//! timeout_secs = 30
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Default backend endpoint (local development server)
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8100";

/// Environment variable overriding the backend URL
pub const ENV_URL: &str = "DSTL_CHAT_URL";

/// Environment variable setting a request timeout in seconds
pub const ENV_TIMEOUT_SECS: &str = "DSTL_CHAT_TIMEOUT_SECS";

/// Resolved client configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend base URL, without trailing slash
    pub base_url: String,
    /// Per-request timeout (`None` = wait indefinitely)
    pub request_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: None,
        }
    }
}

impl ClientConfig {
    /// Configuration pointing at a specific backend
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: normalize_url(&base_url.into()),
            ..Default::default()
        }
    }

    /// Defaults overlaid with environment variables
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(ENV_URL) {
            if !url.trim().is_empty() {
                self.base_url = normalize_url(&url);
            }
        }
        if let Some(secs) = std::env::var(ENV_TIMEOUT_SECS)
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
        {
            self.request_timeout = timeout_from_secs(secs);
        }
    }

    fn apply_file(&mut self, file: &ConfigFile) {
        if let Some(url) = &file.backend.url {
            self.base_url = normalize_url(url);
        }
        if let Some(secs) = file.backend.timeout_secs {
            self.request_timeout = timeout_from_secs(secs);
        }
    }

    fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(url) = &overrides.base_url {
            self.base_url = normalize_url(url);
        }
        if let Some(secs) = overrides.timeout_secs {
            self.request_timeout = timeout_from_secs(secs);
        }
    }
}

/// `0` disables the timeout
fn timeout_from_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

fn normalize_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

// ============================================================================
// File + overrides
// ============================================================================

/// On-disk configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Backend section
    #[serde(default)]
    pub backend: BackendSection,
}

/// `[backend]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BackendSection {
    /// Backend base URL
    pub url: Option<String>,
    /// Request timeout in seconds (0 = none)
    pub timeout_secs: Option<u64>,
}

/// Explicit overrides, typically from the command line
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Backend base URL
    pub base_url: Option<String>,
    /// Request timeout in seconds (0 = none)
    pub timeout_secs: Option<u64>,
    /// Alternate config file
    pub config_path: Option<PathBuf>,
}

/// Where the file layer came from
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigSource {
    /// No file was found; defaults (plus env/overrides) apply
    Defaults,
    /// Loaded from this file
    File(PathBuf),
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but could not be read
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// File path
        path: PathBuf,
        /// I/O error
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML or has unknown keys
    #[error("invalid config file {path}: {source}")]
    Parse {
        /// File path
        path: PathBuf,
        /// TOML error
        #[source]
        source: toml::de::Error,
    },

    /// An explicitly requested file does not exist
    #[error("config file not found: {0}")]
    NotFound(PathBuf),
}

/// Default config file location
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("dstl-chat").join("config.toml"))
}

/// Parse a config file
///
/// # Errors
///
/// Returns [`ConfigError`] if the file cannot be read or parsed.
pub fn load_config_from_path(path: &Path) -> Result<ConfigFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolve the full configuration
///
/// A missing default file is not an error; a missing file named in
/// `overrides.config_path` is.
///
/// # Errors
///
/// Returns [`ConfigError`] if a config file cannot be read or parsed.
pub fn load_config(overrides: &ConfigOverrides) -> Result<(ClientConfig, ConfigSource), ConfigError> {
    let mut config = ClientConfig::default();
    let mut source = ConfigSource::Defaults;

    let path = match &overrides.config_path {
        Some(explicit) => {
            if !explicit.exists() {
                return Err(ConfigError::NotFound(explicit.clone()));
            }
            Some(explicit.clone())
        }
        None => default_config_path().filter(|p| p.exists()),
    };

    if let Some(path) = path {
        let file = load_config_from_path(&path)?;
        config.apply_file(&file);
        debug!(path = ?path, "Loaded config file");
        source = ConfigSource::File(path);
    }

    config.apply_env();
    config.apply_overrides(overrides);

    Ok((config, source))
}
