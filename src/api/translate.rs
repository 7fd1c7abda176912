//! Translation proxy endpoint
//!
//! Holds the DeepL credential server-side and forwards requests. The provider's
//! success body is relayed untouched; every failure becomes an `{error}` body.

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use secrecy::ExposeSecret;

use super::ApiState;
use crate::translation::types::{
    ErrorResponse, ProviderErrorResponse, ProviderRequest, TranslateRequest,
};

/// Build translation router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/translate", post(translate))
        .with_state(state)
}

/// Forward a translation request to DeepL
///
/// The body is decoded by hand so malformed JSON still yields an `{error}` body.
async fn translate(
    State(state): State<Arc<ApiState>>,
    body: Bytes,
) -> Result<Json<serde_json::Value>, ProxyError> {
    let request: TranslateRequest = serde_json::from_slice(&body).map_err(|e| {
        tracing::error!(error = %e, "invalid translation request body");
        ProxyError::Internal
    })?;

    let (Some(text), Some(target_lang)) = (
        request.text.filter(|t| !t.is_empty()),
        request.target_lang.filter(|t| !t.is_empty()),
    ) else {
        return Err(ProxyError::MissingParameters);
    };

    let api_key = state.api_key.as_ref().ok_or(ProxyError::NotConfigured)?;

    tracing::debug!(target_lang = %target_lang, chars = text.len(), "forwarding translation");

    let response = state
        .http
        .post(&state.upstream_url)
        .header(
            header::AUTHORIZATION,
            format!("DeepL-Auth-Key {}", api_key.expose_secret()),
        )
        .json(&ProviderRequest {
            text: [text.as_str()],
            target_lang: target_lang.as_str(),
        })
        .send()
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "DeepL request failed");
            ProxyError::Internal
        })?;

    let status = StatusCode::from_u16(response.status().as_u16())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    if !status.is_success() {
        let body = response.bytes().await.unwrap_or_default();
        let message = serde_json::from_slice::<ProviderErrorResponse>(&body)
            .ok()
            .and_then(|e| e.message)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string());

        tracing::warn!(status = %status, message = %message, "DeepL API error");
        return Err(ProxyError::Upstream {
            status,
            message: format!("DeepL API error: {message}"),
        });
    }

    let data = response.json::<serde_json::Value>().await.map_err(|e| {
        tracing::error!(error = %e, "failed to parse DeepL response");
        ProxyError::Internal
    })?;

    Ok(Json(data))
}

/// Translation proxy errors
#[derive(Debug)]
pub enum ProxyError {
    /// `text` or `targetLang` missing
    MissingParameters,
    /// No provider credential configured
    NotConfigured,
    /// Provider rejected the request
    Upstream {
        status: StatusCode,
        message: String,
    },
    /// Anything else
    Internal,
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            Self::MissingParameters => (
                StatusCode::BAD_REQUEST,
                "Missing required parameters".to_string(),
            ),
            Self::NotConfigured => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "DeepL API key is not configured".to_string(),
            ),
            Self::Upstream { status, message } => (status, message),
            Self::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to process translation request".to_string(),
            ),
        };

        (status, Json(ErrorResponse { error })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn error_of(err: ProxyError) -> (StatusCode, String) {
        let response = err.into_response();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: ErrorResponse = serde_json::from_slice(&body).unwrap();
        (status, json.error)
    }

    #[tokio::test]
    async fn error_bodies_are_structured() {
        assert_eq!(
            error_of(ProxyError::MissingParameters).await,
            (StatusCode::BAD_REQUEST, "Missing required parameters".to_string())
        );
        assert_eq!(
            error_of(ProxyError::NotConfigured).await,
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "DeepL API key is not configured".to_string()
            )
        );
        assert_eq!(
            error_of(ProxyError::Upstream {
                status: StatusCode::FORBIDDEN,
                message: "DeepL API error: quota exceeded".to_string(),
            })
            .await,
            (StatusCode::FORBIDDEN, "DeepL API error: quota exceeded".to_string())
        );
    }
}
