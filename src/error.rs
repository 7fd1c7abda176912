//! Error types for Beacon translate

use thiserror::Error;

/// Result type alias for Beacon translate operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in Beacon translate
#[derive(Debug, Error)]
pub enum Error {
    /// Empty or otherwise unusable user input; no network or platform call was made
    #[error("validation error: {0}")]
    Validation(String),

    /// Deployment configuration error (e.g. missing provider credential)
    #[error("configuration error: {0}")]
    Config(String),

    /// The translation proxy or provider rejected the request
    ///
    /// Displays the relayed message verbatim so it can be shown to the user as-is.
    #[error("{message}")]
    Upstream {
        /// HTTP status relayed from the proxy/provider
        status: u16,
        /// Human-readable message relayed from the proxy/provider
        message: String,
    },

    /// Malformed or empty response between client, proxy and provider
    #[error("transport error: {0}")]
    Transport(String),

    /// Speech capability missing on this platform
    #[error("{0}")]
    Unsupported(String),

    /// A speech session failed mid-flight
    #[error("{0}")]
    Platform(String),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// HTTP status carried by the error, when it came from the proxy or provider
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }
}
