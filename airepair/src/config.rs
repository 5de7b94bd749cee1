//! User configuration loaded from `$XDG_CONFIG_HOME/airepair/config.toml`.
//!
//! A missing file yields the defaults. Read and parse failures are soft: they
//! are logged and the defaults are used, so a broken config never blocks
//! startup.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::cli::Cli;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_THEME: &str = "catppuccin-mocha";
pub const DEFAULT_LANGUAGE: &str = "Python";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub theme: String,
    /// Service serving `/api/analyze` and `/api/repair`.
    pub base_url: String,
    /// Service serving `/api/solve`; falls back to `base_url`.
    pub chat_base_url: Option<String>,
    pub default_language: String,
    /// Whole-request timeout. Requests wait indefinitely when unset.
    pub request_timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: DEFAULT_THEME.to_owned(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            chat_base_url: None,
            default_language: DEFAULT_LANGUAGE.to_owned(),
            request_timeout_secs: None,
        }
    }
}

impl Config {
    /// Loads the config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        match Self::load_from(&config_path()) {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, "using default config");
                Self::default()
            }
        }
    }

    /// Loads the config at `path`. A missing file is not an error.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file");
                return Ok(Self::default());
            }
            Err(source) => return Err(ConfigError::Io { path: path.to_owned(), source }),
        };
        toml::from_str(&raw).map_err(|source| ConfigError::Parse { path: path.to_owned(), source })
    }

    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(url) = &cli.base_url {
            self.base_url = url.clone();
        }
        if let Some(theme) = &cli.theme {
            self.theme = theme.clone();
        }
        if let Some(language) = &cli.language {
            self.default_language = language.clone();
        }
    }

    pub fn chat_base_url(&self) -> &str {
        self.chat_base_url.as_deref().unwrap_or(&self.base_url)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

/// Prefers `$XDG_CONFIG_HOME/airepair/config.toml`, then `~/.config/airepair/config.toml`.
pub fn config_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| std::env::var("HOME").ok().map(|h| PathBuf::from(h).join(".config")))
        .unwrap_or_else(|| PathBuf::from(".config"));
    base.join("airepair").join("config.toml")
}
