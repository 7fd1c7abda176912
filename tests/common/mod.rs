//! Shared test utilities

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
    routing::post,
};
use beacon_translate::ApiServerBuilder;
use beacon_translate::config::DeepLConfig;
use secrecy::SecretString;
use tokio::net::TcpListener;

/// A request received by the mock provider
#[derive(Debug, Clone)]
pub struct Captured {
    pub authorization: Option<String>,
    pub body: serde_json::Value,
}

/// Canned reply and request log for the mock provider
#[derive(Clone)]
struct MockState {
    status: StatusCode,
    body: String,
    captured: Arc<Mutex<Vec<Captured>>>,
}

/// Handle to a running mock DeepL endpoint
pub struct MockDeepL {
    pub url: String,
    captured: Arc<Mutex<Vec<Captured>>>,
}

impl MockDeepL {
    /// Requests received so far
    pub fn requests(&self) -> Vec<Captured> {
        self.captured.lock().expect("mock log poisoned").clone()
    }
}

async fn mock_translate(
    State(state): State<MockState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string);
    let body = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    state
        .captured
        .lock()
        .expect("mock log poisoned")
        .push(Captured {
            authorization,
            body,
        });

    (
        state.status,
        [(header::CONTENT_TYPE, "application/json")],
        state.body,
    )
}

/// Start a mock DeepL translate endpoint replying with `status` and `body`
pub async fn spawn_mock_deepl(status: StatusCode, body: &str) -> MockDeepL {
    let captured = Arc::new(Mutex::new(Vec::new()));
    let state = MockState {
        status,
        body: body.to_string(),
        captured: captured.clone(),
    };

    let app = Router::new()
        .route("/v2/translate", post(mock_translate))
        .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind mock provider");
    let addr = listener.local_addr().expect("mock provider address");
    tokio::spawn(async move { axum::serve(listener, app).await });

    MockDeepL {
        url: format!("http://{addr}/v2/translate"),
        captured,
    }
}

/// Build a proxy server against `upstream_url`
pub fn build_proxy(
    api_key: Option<&str>,
    upstream_url: &str,
    rate_limit: Option<u32>,
) -> beacon_translate::ApiServer {
    let deepl = DeepLConfig {
        api_key: api_key.map(|k| SecretString::from(k.to_string())),
        api_url: upstream_url.to_string(),
    };

    ApiServerBuilder::new(deepl, 0)
        .host("127.0.0.1")
        .rate_limit(rate_limit)
        .build()
}

/// Start a proxy on an ephemeral port and return its base URL
pub async fn spawn_proxy(api_key: Option<&str>, upstream_url: &str) -> String {
    let server = build_proxy(api_key, upstream_url, None);
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind proxy");
    let addr = listener.local_addr().expect("proxy address");
    tokio::spawn(server.serve(listener));

    format!("http://{addr}")
}
