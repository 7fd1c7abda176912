//! Translation client and wire types
//!
//! The client talks to the proxy in [`crate::api`], never to the provider directly.

mod client;
pub mod types;

use async_trait::async_trait;

pub use client::TranslationClient;
pub use types::{Translation, TranslationResponse};

use crate::Result;

/// Something that can translate text into a target language
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` into `target_lang`
    async fn translate(&self, text: &str, target_lang: &str) -> Result<String>;
}
