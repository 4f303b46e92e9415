//! Genre repository
//!
//! - create: unique name → AlreadyExists
//! - add_associations: one multi-row INSERT ... ON CONFLICT DO NOTHING; a
//!   short row count or a foreign key violation → ConstraintFailed

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use musicshop_core::{AlbumId, Genre, GenreId, NewGenre};

use super::{on_unique_violation, GenreRepository};
use crate::db::context::Context;
use crate::db::error::RepoError;
use crate::db::executor::Session;
use crate::db::query::{eq, Delete, Insert, QueryError, Select, Statement};

const RESOURCE: &str = "genre";

/// Postgres-backed genre repository
#[derive(Clone)]
pub struct PgGenreRepo {
    pool: PgPool,
}

impl PgGenreRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn insert_associations(album_id: AlbumId, genre_ids: &[GenreId]) -> Result<Statement, QueryError> {
    genre_ids
        .iter()
        .fold(
            Insert::into_table("album_genres").columns(&["album_id", "genre_id"]),
            |insert, &genre_id| insert.values([album_id, genre_id]),
        )
        .suffix("ON CONFLICT DO NOTHING")
        .build()
}

#[async_trait]
impl GenreRepository for PgGenreRepo {
    async fn create(&self, ctx: &Context, genre: &NewGenre) -> Result<GenreId, RepoError> {
        let stmt = Insert::into_table("genres")
            .columns(&["name"])
            .values([genre.name.as_str()])
            .suffix("RETURNING id")
            .build()?;

        let row = Session::resolve(&self.pool, ctx)
            .query_row(&stmt)
            .await
            .map_err(|e| {
                on_unique_violation(e, || RepoError::AlreadyExists {
                    resource: RESOURCE,
                    detail: format!("'{}'", genre.name.as_str()),
                })
            })?
            .ok_or(sqlx::Error::RowNotFound)?;

        let id: GenreId = row.try_get("id")?;
        tracing::debug!(genre_id = id, "genre inserted");
        Ok(id)
    }

    async fn add_associations(
        &self,
        ctx: &Context,
        album_id: AlbumId,
        genre_ids: &[GenreId],
    ) -> Result<(), RepoError> {
        if genre_ids.is_empty() {
            return Ok(());
        }

        let stmt = insert_associations(album_id, genre_ids)?;
        let affected = Session::resolve(&self.pool, ctx)
            .exec(&stmt)
            .await
            .map_err(|e| {
                if e.is_foreign_key_violation() {
                    RepoError::ConstraintFailed {
                        album_id,
                        reason: "unknown album or genre".to_owned(),
                    }
                } else {
                    RepoError::Storage(e)
                }
            })?;

        let requested = genre_ids.len() as u64;
        if affected != requested {
            return Err(RepoError::ConstraintFailed {
                album_id,
                reason: format!("{affected} of {requested} associations inserted"),
            });
        }

        tracing::debug!(album_id, count = affected, "genre associations inserted");
        Ok(())
    }

    async fn find_all(&self, ctx: &Context) -> Result<Vec<Genre>, RepoError> {
        let stmt = Select::columns(&["id", "name"])
            .from("genres")
            .order_by(&["id"])
            .build()?;
        let rows = Session::resolve(&self.pool, ctx).query(&stmt).await?;

        let genres = rows
            .iter()
            .map(|row| {
                Ok(Genre {
                    id: row.try_get("id")?,
                    name: row.try_get("name")?,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?;
        Ok(genres)
    }

    async fn delete(&self, ctx: &Context, id: GenreId) -> Result<(), RepoError> {
        let stmt = Delete::from("genres").filter(eq("id", id)).build()?;
        let affected = Session::resolve(&self.pool, ctx).exec(&stmt).await?;

        if affected == 0 {
            return Err(RepoError::NotFound {
                resource: RESOURCE,
                id,
            });
        }
        tracing::debug!(genre_id = id, "genre deleted");
        Ok(())
    }
}
