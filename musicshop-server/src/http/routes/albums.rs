//! Album endpoints

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use musicshop_core::entity::validate_id;
use musicshop_core::{Album, AlbumId, GenreId, NewAlbum, ValidationError};

use crate::http::error::ApiError;
use crate::http::extractors::{JsonBody, ValidId};
use crate::http::server::AppState;

/// Genre reference inside a create-album request
#[derive(Debug, Deserialize)]
pub struct GenreRef {
    pub id: GenreId,
}

/// Create album request
#[derive(Debug, Deserialize)]
pub struct CreateAlbumRequest {
    pub title: String,
    pub artist: String,
    pub price: f64,
    #[serde(default)]
    pub genres: Vec<GenreRef>,
}

impl CreateAlbumRequest {
    fn into_new_album(self) -> Result<NewAlbum, ValidationError> {
        let genre_ids = self.genres.into_iter().map(|g| g.id).collect();
        NewAlbum::new(&self.title, &self.artist, self.price, genre_ids)
    }
}

/// Genre reference inside an add-genres request
#[derive(Debug, Deserialize)]
pub struct GenreLink {
    pub genre_id: GenreId,
}

/// Add genres to album request
#[derive(Debug, Deserialize)]
pub struct AddGenresRequest {
    pub genres: Vec<GenreLink>,
}

impl AddGenresRequest {
    fn into_genre_ids(self) -> Result<Vec<GenreId>, ValidationError> {
        if self.genres.is_empty() {
            return Err(ValidationError::Empty { field: "genres" });
        }
        self.genres
            .into_iter()
            .map(|g| validate_id("genre id", g.genre_id))
            .collect()
    }
}

/// Id of a newly created resource
#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: i64,
}

/// GET /albums - every album with its genres
async fn list_albums(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Album>>, ApiError> {
    let ctx = state.request_context();
    let albums = state.catalog.list_albums(&ctx).await?;
    Ok(Json(albums))
}

/// POST /albums - create an album and its genre associations atomically
async fn create_album(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<CreateAlbumRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let album = req.into_new_album()?;
    let ctx = state.request_context();
    let id: AlbumId = state.catalog.create_album(&ctx, album).await?;

    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// GET /albums/{id}
async fn get_album(
    State(state): State<Arc<AppState>>,
    ValidId(id): ValidId,
) -> Result<Json<Album>, ApiError> {
    let ctx = state.request_context();
    Ok(Json(state.catalog.get_album(&ctx, id).await?))
}

/// DELETE /albums/{id}
async fn delete_album(
    State(state): State<Arc<AppState>>,
    ValidId(id): ValidId,
) -> Result<StatusCode, ApiError> {
    let ctx = state.request_context();
    state.catalog.delete_album(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /albums/{id}/genres
async fn add_genres(
    State(state): State<Arc<AppState>>,
    ValidId(id): ValidId,
    JsonBody(req): JsonBody<AddGenresRequest>,
) -> Result<StatusCode, ApiError> {
    let genre_ids = req.into_genre_ids()?;
    let ctx = state.request_context();
    state.catalog.add_genres_to_album(&ctx, id, genre_ids).await?;
    Ok(StatusCode::CREATED)
}

/// Album routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/albums", get(list_albums).post(create_album))
        .route("/albums/{id}", get(get_album).delete(delete_album))
        .route("/albums/{id}/genres", post(add_genres))
}
