//! Wire types shared by the translation client and proxy

use serde::{Deserialize, Serialize};

/// Request body accepted by `POST /translate`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateRequest {
    /// Text to translate
    #[serde(default)]
    pub text: Option<String>,

    /// Provider target language code (e.g. "ES")
    #[serde(default)]
    pub target_lang: Option<String>,
}

/// Body forwarded to the DeepL translate endpoint
#[derive(Debug, Serialize)]
pub struct ProviderRequest<'a> {
    pub text: [&'a str; 1],
    pub target_lang: &'a str,
}

/// DeepL response envelope, relayed unchanged by the proxy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationResponse {
    pub translations: Vec<Translation>,
}

/// One translated text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    /// Source language detected by the provider
    #[serde(default)]
    pub detected_source_language: String,

    /// Translated text
    pub text: String,
}

/// Error body returned by the proxy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Error body returned by the provider
#[derive(Debug, Default, Deserialize)]
pub struct ProviderErrorResponse {
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_uses_camel_case_target() {
        let json = serde_json::to_value(TranslateRequest {
            text: Some("hello".to_string()),
            target_lang: Some("ES".to_string()),
        })
        .unwrap();

        assert_eq!(json, serde_json::json!({ "text": "hello", "targetLang": "ES" }));
    }

    #[test]
    fn provider_request_wraps_text_in_array() {
        let json = serde_json::to_value(ProviderRequest {
            text: ["hello"],
            target_lang: "ES",
        })
        .unwrap();

        assert_eq!(json, serde_json::json!({ "text": ["hello"], "target_lang": "ES" }));
    }

    #[test]
    fn missing_fields_deserialize_as_none() {
        let req: TranslateRequest = serde_json::from_str(r#"{"text":"hi"}"#).unwrap();
        assert_eq!(req.text.as_deref(), Some("hi"));
        assert!(req.target_lang.is_none());
    }
}
