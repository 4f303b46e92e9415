//! Axum server setup
//!
//! Server skeleton with:
//! - Localhost-only CORS by default
//! - Tracing middleware
//! - Per-request `Context` with the configured timeout
//! - Graceful shutdown on SIGTERM/Ctrl+C or a cancellation token

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use axum::Router;
use musicshop_core::HttpConfig;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::routes;
use crate::db::Context;
use crate::service::PgCatalogService;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to (default: 127.0.0.1:8080)
    pub bind_addr: SocketAddr,

    /// Allow permissive CORS (default: false = localhost only)
    pub cors_permissive: bool,

    /// Deadline applied to every request's database work
    pub request_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            cors_permissive: false,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl ServerConfig {
    /// Build from the `[http]` config section.
    pub fn from_http(http: &HttpConfig) -> Result<Self, ServerError> {
        let bind_addr = format!("{}:{}", http.host, http.port)
            .parse()
            .map_err(|_| ServerError::InvalidBind(format!("{}:{}", http.host, http.port)))?;

        Ok(Self {
            bind_addr,
            cors_permissive: http.cors_permissive,
            request_timeout: http.request_timeout(),
        })
    }
}

/// Shared application state
pub struct AppState {
    pub pool: PgPool,
    pub catalog: PgCatalogService,
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(pool: PgPool, request_timeout: Duration) -> Self {
        Self {
            catalog: PgCatalogService::from_pool(pool.clone()),
            pool,
            request_timeout,
        }
    }

    /// Fresh context for one request.
    pub fn request_context(&self) -> Context {
        Context::background().with_timeout(self.request_timeout)
    }
}

fn cors_layer(permissive: bool) -> CorsLayer {
    if permissive {
        tracing::warn!("CORS: Permissive mode enabled - all origins allowed");
        return CorsLayer::permissive();
    }

    CorsLayer::new()
        .allow_origin([
            HeaderValue::from_static("http://localhost:3000"),
            HeaderValue::from_static("http://localhost:8080"),
            HeaderValue::from_static("http://127.0.0.1:3000"),
            HeaderValue::from_static("http://127.0.0.1:8080"),
        ])
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Build the application router.
pub fn build_router(state: Arc<AppState>, cors_permissive: bool) -> Router {
    Router::new()
        .merge(routes::health::router())
        .merge(routes::albums::router())
        .merge(routes::genres::router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(cors_permissive)),
        )
        .with_state(state)
}

/// Run the HTTP server until a shutdown signal arrives or `shutdown` is
/// cancelled. The pool is left open; closing it is the caller's job.
///
/// # Example
///
/// ```ignore
/// let pool = connect(&settings).await?;
/// run_server(pool.clone(), ServerConfig::default(), CancellationToken::new()).await?;
/// pool.close().await;
/// ```
pub async fn run_server(
    pool: PgPool,
    config: ServerConfig,
    shutdown: CancellationToken,
) -> Result<(), ServerError> {
    let state = Arc::new(AppState::new(pool, config.request_timeout));
    let app = build_router(state, config.cors_permissive);

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for Ctrl+C, SIGTERM or cancellation of `token`.
async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting shutdown");
        }
        _ = token.cancelled() => {
            tracing::info!("Shutdown requested");
        }
    }
}

/// Server error type
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid bind address: {0}")]
    InvalidBind(String),
}
