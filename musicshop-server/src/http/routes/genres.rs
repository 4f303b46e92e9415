//! Genre endpoints

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use serde::Deserialize;

use musicshop_core::{Genre, NewGenre};

use super::albums::CreatedResponse;
use crate::http::error::ApiError;
use crate::http::extractors::{JsonBody, ValidId};
use crate::http::server::AppState;

/// Create genre request
#[derive(Debug, Deserialize)]
pub struct CreateGenreRequest {
    pub name: String,
}

/// GET /genres - ordered by id
async fn list_genres(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Genre>>, ApiError> {
    let ctx = state.request_context();
    Ok(Json(state.catalog.list_genres(&ctx).await?))
}

/// POST /genres
async fn create_genre(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<CreateGenreRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let genre = NewGenre::new(&req.name)?;
    let ctx = state.request_context();
    let id = state.catalog.create_genre(&ctx, genre).await?;

    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// DELETE /genres/{id}
async fn delete_genre(
    State(state): State<Arc<AppState>>,
    ValidId(id): ValidId,
) -> Result<StatusCode, ApiError> {
    let ctx = state.request_context();
    state.catalog.delete_genre(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Genre routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/genres", get(list_genres).post(create_genre))
        .route("/genres/{id}", delete(delete_genre))
}
