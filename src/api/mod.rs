//! HTTP API server: the translation proxy
//!
//! Serves `POST /translate`, health checks and, optionally, the browser front end.

pub mod health;
pub mod rate_limit;
pub mod translate;

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use secrecy::SecretString;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::config::{ApiServerConfig, DeepLConfig};
use crate::Result;

/// Shared state for API handlers
pub struct ApiState {
    /// HTTP client used to reach the provider
    pub http: reqwest::Client,
    /// Provider credential; `None` means every request fails as not configured
    pub api_key: Option<SecretString>,
    /// Provider translate endpoint
    pub upstream_url: String,
    /// Global rate limiter, when configured
    pub rate_limiter: Option<rate_limit::SharedLimiter>,
}

/// Configuration for building an API server
pub struct ApiServerBuilder {
    api_key: Option<SecretString>,
    upstream_url: String,
    host: String,
    port: u16,
    static_dir: Option<PathBuf>,
    rate_limit_per_minute: Option<u32>,
}

impl ApiServerBuilder {
    /// Create a new API server builder from provider configuration
    #[must_use]
    pub fn new(deepl: DeepLConfig, port: u16) -> Self {
        Self {
            api_key: deepl.api_key,
            upstream_url: deepl.api_url,
            host: "0.0.0.0".to_string(),
            port,
            static_dir: None,
            rate_limit_per_minute: None,
        }
    }

    /// Apply server settings from `ApiServerConfig`
    #[must_use]
    pub fn server_config(mut self, config: &ApiServerConfig) -> Self {
        self.host.clone_from(&config.host);
        self.static_dir.clone_from(&config.static_dir);
        self.rate_limit_per_minute = config.rate_limit_per_minute;
        self
    }

    /// Set the interface to bind
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the static files directory for serving the web UI
    #[must_use]
    pub fn static_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.static_dir = dir;
        self
    }

    /// Limit translation requests per minute
    #[must_use]
    pub const fn rate_limit(mut self, requests_per_minute: Option<u32>) -> Self {
        self.rate_limit_per_minute = requests_per_minute;
        self
    }

    /// Build the API server
    #[must_use]
    pub fn build(self) -> ApiServer {
        let rate_limiter = self.rate_limit_per_minute.map(rate_limit::create_limiter);

        let state = Arc::new(ApiState {
            http: reqwest::Client::new(),
            api_key: self.api_key,
            upstream_url: self.upstream_url,
            rate_limiter,
        });

        ApiServer {
            state,
            host: self.host,
            port: self.port,
            static_dir: self.static_dir,
        }
    }
}

/// API server
pub struct ApiServer {
    state: Arc<ApiState>,
    host: String,
    port: u16,
    static_dir: Option<PathBuf>,
}

impl ApiServer {
    /// Build the router with all routes
    #[must_use]
    pub fn router(&self) -> Router {
        let translate = translate::router(self.state.clone()).layer(
            axum::middleware::from_fn_with_state(
                self.state.clone(),
                rate_limit::rate_limit_middleware,
            ),
        );

        let mut router = Router::new()
            .merge(translate)
            .merge(health::router())
            .merge(health::ready_router(self.state.clone()));

        // Serve the browser front end if configured
        if let Some(static_dir) = &self.static_dir {
            let index_file = static_dir.join("index.html");
            let serve_dir = ServeDir::new(static_dir)
                .not_found_service(ServeFile::new(&index_file));

            router = router.fallback_service(serve_dir);
            tracing::info!(path = %static_dir.display(), "serving static files");
        }

        // CORS layer for cross-origin requests from frontend
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        router.layer(cors).layer(TraceLayer::new_for_http())
    }

    /// Run the API server
    ///
    /// # Errors
    ///
    /// Returns error if server fails to bind or run
    pub async fn run(self) -> Result<()> {
        let addr = format!("{}:{}", self.host, self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| crate::Error::Config(format!("failed to bind API server: {e}")))?;

        self.serve(listener).await
    }

    /// Serve on an already-bound listener
    ///
    /// # Errors
    ///
    /// Returns error if the server fails while running
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        if self.state.api_key.is_none() {
            tracing::warn!("no DeepL API key configured - translation requests will be rejected");
        }

        let port = listener.local_addr().map(|a| a.port()).unwrap_or(self.port);
        tracing::info!(port, upstream = %self.state.upstream_url, "translation proxy listening");

        axum::serve(listener, self.router())
            .await
            .map_err(|e| crate::Error::Config(format!("API server error: {e}")))?;

        Ok(())
    }
}
