//! Startup configuration
//!
//! The only setting is the default window class used when a tool call names
//! none. It is read once before the server starts and never changes after.

use crate::constants::DEFAULT_CONFIG_FILE;
use crate::errors::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct WindowsConfig {
    #[serde(default)]
    pub hwnd_class: Option<String>,
}

/// Contents of the JSON config file
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ServerConfig {
    #[serde(default)]
    pub windows: WindowsConfig,
}

impl ServerConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &text)
    }

    fn parse(path: &Path, text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text.trim_start_matches('\u{feff}')).map_err(|source| {
            ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }
        })
    }

    /// Load the config, falling back to defaults on any problem.
    ///
    /// Without an explicit path the default file in the working directory is
    /// tried, and its absence is not worth a warning.
    pub fn load(explicit: Option<&Path>) -> Self {
        let path = explicit
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        if explicit.is_none() && !path.exists() {
            tracing::debug!("No config file at {:?}, using defaults", path);
            return Self::default();
        }

        match Self::from_file(&path) {
            Ok(config) => {
                tracing::info!("Loaded config from {:?}", path);
                config
            }
            Err(e) => {
                tracing::warn!("{}; using defaults", e);
                Self::default()
            }
        }
    }

    /// Configured default class; blank values count as unset
    pub fn default_hwnd_class(&self) -> Option<&str> {
        self.windows
            .hwnd_class
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }

    /// Default class after applying a command-line override
    pub fn resolve_hwnd_class(&self, cli_override: Option<&str>) -> Option<String> {
        cli_override
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .or_else(|| self.default_hwnd_class())
            .map(str::to_string)
    }
}
