//! Health check endpoint

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::db::{pool, DbError};
use crate::http::error::ApiError;
use crate::http::server::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
    pub version: &'static str,
}

impl HealthResponse {
    fn up() -> Self {
        Self {
            status: "ok",
            database: "up",
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

/// GET /health - 503 when the database does not answer a ping
async fn health(State(state): State<Arc<AppState>>) -> Result<Json<HealthResponse>, ApiError> {
    let ctx = state.request_context();
    ctx.guard(async { pool::ping(&state.pool).await.map_err(DbError::from) })
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "health check failed");
            ApiError::Unavailable
        })?;

    Ok(Json(HealthResponse::up()))
}

/// Health routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(health))
}
