//! API error type with IntoResponse
//!
//! Every failure becomes `{"error": <code>, "message": <text>}` with a
//! matching status code. Service errors carry no storage detail, so their
//! messages are safe to return as-is.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use musicshop_core::ValidationError;

use crate::service::ServiceError;

#[derive(Debug)]
pub enum ApiError {
    /// Validation failed (400)
    Validation(ValidationError),

    /// Body could not be read as the expected JSON (400)
    BadRequest { message: String },

    /// Resource not found (404)
    NotFound(ServiceError),

    /// Uniqueness conflict (409)
    Conflict(ServiceError),

    /// Operation failed; detail already logged by the service (500)
    Internal(ServiceError),

    /// Database unreachable (503)
    Unavailable,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::BadRequest { .. } => "bad_request",
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
            Self::Internal(_) => "internal_error",
            Self::Unavailable => "unavailable",
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Validation(e) => e.to_string(),
            Self::BadRequest { message } => message.clone(),
            Self::NotFound(e) | Self::Conflict(e) | Self::Internal(e) => e.to_string(),
            Self::Unavailable => "database unavailable".to_owned(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = json!({
            "error": self.code(),
            "message": self.message()
        });

        (status, Json(body)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        Self::BadRequest {
            message: e.body_text(),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::AlbumNotFound | ServiceError::GenreNotFound | ServiceError::GenreNotExists => {
                Self::NotFound(e)
            }
            ServiceError::AlbumAlreadyExists | ServiceError::GenreAlreadyExists => Self::Conflict(e),
            ServiceError::CannotCreateAlbum
            | ServiceError::CannotFetchAlbums
            | ServiceError::CannotFetchAlbum
            | ServiceError::CannotDeleteAlbum
            | ServiceError::CannotCreateGenre
            | ServiceError::CannotFetchGenres
            | ServiceError::CannotDeleteGenre
            | ServiceError::CannotAddGenres => Self::Internal(e),
        }
    }
}
