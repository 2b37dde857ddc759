//! Configuration file loading
//!
//! The service resolves every setting through the same priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! Tiers 1 and 2 are handled by clap in the server crate; this module
//! owns tier 3: locating and parsing the TOML file.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Settings readable from the TOML config file
///
/// Every field is optional; absent fields fall through to the compiled
/// defaults in the server crate.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Bind host for the HTTP server
    pub bind_host: Option<String>,
    /// Bind port for the HTTP server
    pub bind_port: Option<u16>,
    /// API key for the hosted generative model
    pub gemini_api_key: Option<String>,
    /// Model name for the hosted generative model
    pub gemini_model: Option<String>,
    /// Base URL of the emotion classification service
    pub emotion_service_url: Option<String>,
    /// Base URL of the text embedding service
    pub embedding_service_url: Option<String>,
    /// Path to the song catalog JSON file
    pub catalog_path: Option<String>,
    /// Directory where saved diaries are written
    pub diary_dir: Option<String>,
    /// Idle session lifetime in seconds
    pub session_ttl_secs: Option<u64>,
    /// Maximum number of live sessions
    pub session_capacity: Option<usize>,
}

/// Locate the config file for the platform
///
/// Checks the user config directory first
/// (e.g. `~/.config/deep-diary/config.toml` on Linux), then
/// `/etc/deep-diary/config.toml` on Unix systems.
pub fn locate_config_file() -> Option<PathBuf> {
    if let Some(dir) = dirs::config_dir() {
        let user_config = dir.join("deep-diary").join("config.toml");
        if user_config.exists() {
            return Some(user_config);
        }
    }

    if cfg!(unix) {
        let system_config = PathBuf::from("/etc/deep-diary/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Read and parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Load the platform config file if one exists, defaults otherwise
pub fn load_default_config() -> Result<TomlConfig> {
    match locate_config_file() {
        Some(path) => load_toml_config(&path),
        None => Ok(TomlConfig::default()),
    }
}
