//! Backend endpoint configuration.
//!
//! Resolution order: `COLLOQUY_BASE_URL` environment variable, then
//! `~/.config/colloquy/config.toml`, then the compiled default. The base URL
//! is never hardcoded into request-building code.

use colloquy_core::{ChatError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DEFAULT_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Environment variable overriding the backend base URL.
pub const BASE_URL_ENV: &str = "COLLOQUY_BASE_URL";

/// Connection settings for the question-answering backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the backend, without a trailing path.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// On-disk layout of config.toml.
#[derive(Debug, Default, Deserialize)]
struct ConfigRoot {
    #[serde(default)]
    api: Option<ApiConfig>,
}

impl ApiConfig {
    /// Resolves the effective configuration.
    ///
    /// The environment variable wins over the config file; a missing file
    /// falls back to defaults. A present but unreadable file is an error so
    /// that a typo does not silently send traffic to localhost.
    pub fn load() -> Result<Self> {
        let mut config = match default_config_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };

        if let Ok(base_url) = std::env::var(BASE_URL_ENV) {
            if !base_url.trim().is_empty() {
                tracing::debug!(%base_url, "base url taken from environment");
                config.base_url = base_url.trim().to_string();
            }
        }

        Ok(config)
    }

    /// Loads configuration from a specific TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ChatError::config(format!("cannot read {}: {e}", path.display())))?;
        let root: ConfigRoot = toml::from_str(&content)
            .map_err(|e| ChatError::config(format!("invalid {}: {e}", path.display())))?;
        Ok(root.api.unwrap_or_default())
    }
}

/// Returns the default path to config.toml: `~/.config/colloquy/config.toml`.
fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("colloquy").join("config.toml"))
}
