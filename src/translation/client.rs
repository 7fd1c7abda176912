//! HTTP client for the translation proxy

use async_trait::async_trait;

use super::Translator;
use super::types::{ErrorResponse, TranslateRequest, TranslationResponse};
use crate::{Error, Result};

/// Message used when the proxy fails without an error body
const GENERIC_FAILURE: &str = "Translation failed";

/// Calls `POST /translate` on a translation proxy
#[derive(Debug, Clone)]
pub struct TranslationClient {
    client: reqwest::Client,
    endpoint: String,
}

impl TranslationClient {
    /// Create a client for the proxy at `base_url` (e.g. `http://localhost:18791`)
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create a client reusing an existing HTTP client
    #[must_use]
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}/translate", base_url.trim_end_matches('/')),
        }
    }

    /// Full URL of the proxy endpoint
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Translate `text` into the language identified by `target_lang`
    ///
    /// # Errors
    ///
    /// Returns `Error::Upstream` with the proxy's message when the proxy rejects
    /// the request, `Error::Transport` when the response holds no translations,
    /// and HTTP/serialization errors for transport failures.
    pub async fn translate(&self, text: &str, target_lang: &str) -> Result<String> {
        tracing::debug!(
            endpoint = %self.endpoint,
            target_lang,
            chars = text.len(),
            "requesting translation"
        );

        let request = TranslateRequest {
            text: Some(text.to_string()),
            target_lang: Some(target_lang.to_string()),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "translation request failed");
                e
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .ok()
                .map(|e| e.error)
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| GENERIC_FAILURE.to_string());

            tracing::warn!(status = %status, message = %message, "translation rejected");
            return Err(Error::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.bytes().await?;
        let data: TranslationResponse = serde_json::from_slice(&body)?;

        let translation = data.translations.into_iter().next().ok_or_else(|| {
            Error::Transport("translation response contained no translations".to_string())
        })?;

        tracing::debug!(
            detected = %translation.detected_source_language,
            "translation complete"
        );
        Ok(translation.text)
    }
}

#[async_trait]
impl Translator for TranslationClient {
    async fn translate(&self, text: &str, target_lang: &str) -> Result<String> {
        Self::translate(self, text, target_lang).await
    }
}
