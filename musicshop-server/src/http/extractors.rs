//! Custom Axum extractors

use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::request::Parts;
use axum::Json;
use serde::de::DeserializeOwned;

use musicshop_core::entity::validate_id;
use musicshop_core::ValidationError;

use super::error::ApiError;

/// Extract and validate a positive integer id from the path
pub struct ValidId(pub i64);

impl<S> FromRequestParts<S> for ValidId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw): Path<String> = Path::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::Validation(ValidationError::Empty { field: "id" }))?;

        Ok(Self(parse_id(&raw)?))
    }
}

fn parse_id(raw: &str) -> Result<i64, ValidationError> {
    let id = raw.parse::<i64>().map_err(|_| ValidationError::InvalidId {
        field: "id",
        value: raw.to_owned(),
    })?;
    validate_id("id", id)
}

/// `Json<T>` whose rejection is a JSON `ApiError` instead of plain text
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}
