//! TOML configuration file loading
//!
//! Supports `~/.config/omni/beacon-translate/config.toml` as a persistent config source.
//! All fields are optional; the file is a partial overlay on top of defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct TranslateConfigFile {
    /// DeepL provider configuration
    #[serde(default)]
    pub deepl: DeepLFileConfig,

    /// Proxy server configuration
    #[serde(default)]
    pub server: ServerFileConfig,

    /// Translation client / session configuration
    #[serde(default)]
    pub client: ClientFileConfig,
}

/// DeepL provider configuration
#[derive(Debug, Default, Deserialize)]
pub struct DeepLFileConfig {
    /// DeepL authentication key
    pub api_key: Option<String>,

    /// Translation endpoint override
    pub api_url: Option<String>,
}

/// Proxy server configuration
#[derive(Debug, Default, Deserialize)]
pub struct ServerFileConfig {
    /// Port to listen on
    pub port: Option<u16>,

    /// Interface to bind
    pub host: Option<String>,

    /// Directory with the browser front end
    pub static_dir: Option<String>,

    /// Global translation requests per minute (unset = unlimited)
    pub rate_limit_per_minute: Option<u32>,
}

/// Translation client configuration
#[derive(Debug, Default, Deserialize)]
pub struct ClientFileConfig {
    /// Base URL of the translation proxy
    pub proxy_url: Option<String>,

    /// Default source language code
    pub source_language: Option<String>,

    /// Default target language code
    pub target_language: Option<String>,
}

/// Load the TOML config file from the standard path
///
/// Returns `TranslateConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file() -> TranslateConfigFile {
    config_file_path().map_or_else(TranslateConfigFile::default, |path| load_from(&path))
}

/// Load a TOML config file from an explicit path
///
/// Missing or invalid files yield defaults.
pub fn load_from(path: &Path) -> TranslateConfigFile {
    if !path.exists() {
        return TranslateConfigFile::default();
    }

    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                TranslateConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            TranslateConfigFile::default()
        }
    }
}

/// Return the config file path: `~/.config/omni/beacon-translate/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| {
        d.config_dir()
            .join("omni")
            .join("beacon-translate")
            .join("config.toml")
    })
}
