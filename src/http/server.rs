//! HTTP server setup and request handlers.
//!
//! # Responsibilities
//! - Create the Axum router with the two application routes
//! - Wire up middleware (request timeout, tracing)
//! - Bind the server to a listener and run until shutdown
//!
//! # Design Decisions
//! - The cache client is injected as a trait object; handlers never know
//!   which store backs them
//! - Cache failures surface as 503 with the error text, unretried

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::cache::CacheClient;
use crate::config::ServerConfig;
use crate::status;

/// Welcome page served at `/`.
const WELCOME_PAGE: &str = "<!DOCTYPE html>\n\
<html lang=\"en\">\n\
<head><title>Welcome</title></head>\n\
<body><h1>Your new application is ready.</h1></body>\n\
</html>\n";

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<dyn CacheClient>,
}

/// HTTP server for the status service.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration and cache.
    pub fn new(config: &ServerConfig, cache: Arc<dyn CacheClient>) -> Self {
        let state = AppState { cache };
        let router = Router::new()
            .route("/", get(index_handler))
            .route("/status", get(status_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(TraceLayer::new_for_http());

        Self { router }
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// `GET /` — static welcome page.
async fn index_handler() -> Html<&'static str> {
    Html(WELCOME_PAGE)
}

/// `GET /status` — cache round-trip probe, plain text.
async fn status_handler(State(state): State<AppState>) -> Response {
    match status::probe(state.cache.as_ref()).await {
        Ok(message) => (StatusCode::OK, message).into_response(),
        Err(err) => {
            tracing::error!(error = %err, "status probe failed");
            (StatusCode::SERVICE_UNAVAILABLE, err.to_string()).into_response()
        }
    }
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received");
}
