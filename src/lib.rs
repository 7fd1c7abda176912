//! Beacon Translate - Voice translation front end
//!
//! This library provides the pieces of a speak-translate-speak session:
//! - Language registry mapping translation codes to speech locales
//! - DeepL translation proxy (HTTP server holding the credential)
//! - Translation client for the proxy
//! - Speech recognition and synthesis adapters over platform engines
//! - Session controller tying them together
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                     Session                          │
//! │   Recognition  │  Controller  │  Synthesis          │
//! └────────────────────┬────────────────────────────────┘
//!                      │ TranslationClient
//! ┌────────────────────▼────────────────────────────────┐
//! │               Translation Proxy                      │
//! │   POST /translate  │  /health  │  /ready            │
//! └────────────────────┬────────────────────────────────┘
//!                      │ DeepL-Auth-Key
//! ┌────────────────────▼────────────────────────────────┐
//! │                   DeepL API                          │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod languages;
pub mod session;
pub mod speech;
pub mod translation;

pub use api::{ApiServer, ApiServerBuilder};
pub use config::Config;
pub use error::{Error, Result};
pub use languages::{LANGUAGES, Language};
pub use session::{
    CompletedTranslation, Controller, ControllerBuilder, ErrorSource, Notice, PendingTranslation,
    SessionState, Severity,
};
pub use translation::{TranslationClient, Translator};
