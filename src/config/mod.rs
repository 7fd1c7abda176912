//! Configuration management for Beacon translate
//!
//! Values resolve as env > TOML file > default.

pub mod file;

use std::path::{Path, PathBuf};

use secrecy::SecretString;

use crate::languages;
use crate::{Error, Result};

/// DeepL endpoint for free-tier keys (suffix `:fx`)
pub const DEEPL_FREE_URL: &str = "https://api-free.deepl.com/v2/translate";

/// DeepL endpoint for pro keys
pub const DEEPL_PRO_URL: &str = "https://api.deepl.com/v2/translate";

/// Default proxy port
pub const DEFAULT_PORT: u16 = 18791;

/// Beacon translate configuration
#[derive(Debug)]
pub struct Config {
    /// Translation provider configuration
    pub deepl: DeepLConfig,

    /// HTTP proxy server configuration
    pub api_server: ApiServerConfig,

    /// Translation client / session configuration
    pub client: ClientConfig,
}

/// Translation provider configuration
#[derive(Debug)]
pub struct DeepLConfig {
    /// Provider credential (from `DEEPL_API_KEY`)
    ///
    /// Absence is not a startup failure; the proxy reports it per request.
    pub api_key: Option<SecretString>,

    /// Translation endpoint
    pub api_url: String,
}

/// HTTP proxy server configuration
#[derive(Debug, Clone)]
pub struct ApiServerConfig {
    /// Interface to bind
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Path to static files directory (browser front end)
    pub static_dir: Option<PathBuf>,

    /// Global translation requests per minute (unset = unlimited)
    pub rate_limit_per_minute: Option<u32>,
}

/// Translation client / session configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the translation proxy
    pub proxy_url: String,

    /// Default source language code
    pub source_language: String,

    /// Default target language code
    pub target_language: String,
}

impl DeepLConfig {
    /// Pick the DeepL endpoint matching the key's plan
    #[must_use]
    pub fn endpoint_for_key(api_key: Option<&str>) -> &'static str {
        match api_key {
            Some(key) if !key.ends_with(":fx") => DEEPL_PRO_URL,
            _ => DEEPL_FREE_URL,
        }
    }
}

impl Config {
    /// Load configuration from the standard config file and process env
    ///
    /// # Errors
    ///
    /// Returns error if a configured value is invalid
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let fc = path.map_or_else(file::load_config_file, file::load_from);
        Self::resolve(fc, |key| std::env::var(key).ok())
    }

    /// Resolve configuration from a parsed file and an env lookup
    ///
    /// # Errors
    ///
    /// Returns error if a configured language code is not supported
    pub fn resolve(
        fc: file::TranslateConfigFile,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let var = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        // Provider credential (env > toml)
        let api_key = var("DEEPL_API_KEY").or(fc.deepl.api_key);
        let api_url = var("DEEPL_API_URL")
            .or(fc.deepl.api_url)
            .unwrap_or_else(|| DeepLConfig::endpoint_for_key(api_key.as_deref()).to_string());
        let deepl = DeepLConfig {
            api_key: api_key.map(SecretString::from),
            api_url,
        };

        // API server config (env > toml > default)
        let api_server = ApiServerConfig {
            host: var("BEACON_TRANSLATE_HOST")
                .or(fc.server.host)
                .unwrap_or_else(|| "0.0.0.0".to_string()),
            port: var("BEACON_TRANSLATE_PORT")
                .or_else(|| var("PORT"))
                .and_then(|s| s.parse().ok())
                .or(fc.server.port)
                .unwrap_or(DEFAULT_PORT),
            static_dir: var("BEACON_TRANSLATE_STATIC_DIR")
                .or(fc.server.static_dir)
                .map(PathBuf::from),
            rate_limit_per_minute: var("BEACON_TRANSLATE_RATE_LIMIT")
                .and_then(|s| s.parse().ok())
                .or(fc.server.rate_limit_per_minute)
                .filter(|rpm| *rpm > 0),
        };

        // Client config (env > toml > default)
        let client = ClientConfig {
            proxy_url: var("BEACON_TRANSLATE_PROXY_URL")
                .or(fc.client.proxy_url)
                .unwrap_or_else(|| format!("http://localhost:{}", api_server.port)),
            source_language: fc.client.source_language.unwrap_or_else(|| "EN".to_string()),
            target_language: fc.client.target_language.unwrap_or_else(|| "ES".to_string()),
        };

        for code in [&client.source_language, &client.target_language] {
            if !languages::is_supported(code) {
                return Err(Error::Config(format!("unsupported language code: {code}")));
            }
        }

        if deepl.api_key.is_none() {
            tracing::warn!("DEEPL_API_KEY is not set; translation requests will fail");
        }

        Ok(Self {
            deepl,
            api_server,
            client,
        })
    }
}
