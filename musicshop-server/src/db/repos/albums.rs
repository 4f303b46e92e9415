//! Album repository
//!
//! - create: INSERT ... RETURNING id, unique (title, artist) → AlreadyExists
//! - list/get: one LEFT JOIN aggregate query, genres ordered by id
//! - delete: zero rows affected → NotFound, associations cascade

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use musicshop_core::{Album, AlbumId, Genre, NewAlbum};

use super::{on_unique_violation, AlbumRepository};
use crate::db::context::Context;
use crate::db::error::RepoError;
use crate::db::executor::Session;
use crate::db::query::{eq, Delete, Insert, QueryError, Select, Statement, Value};

const RESOURCE: &str = "album";

/// Postgres-backed album repository
#[derive(Clone)]
pub struct PgAlbumRepo {
    pool: PgPool,
}

impl PgAlbumRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Albums with their genres folded into two parallel arrays. Albums without
/// genres get empty arrays rather than a single NULL element.
fn select_with_genres() -> Select {
    Select::columns(&[
        "a.id",
        "a.title",
        "a.artist",
        "a.price::float8 AS price",
        "COALESCE(array_agg(g.id ORDER BY g.id) FILTER (WHERE g.id IS NOT NULL), '{}') AS genre_ids",
        "COALESCE(array_agg(g.name ORDER BY g.id) FILTER (WHERE g.id IS NOT NULL), '{}') AS genre_names",
    ])
    .from("albums a")
    .left_join("album_genres ag", "ag.album_id = a.id")
    .left_join("genres g", "g.id = ag.genre_id")
    .group_by(&["a.id"])
    .order_by(&["a.id"])
}

fn insert_album(album: &NewAlbum) -> Result<Statement, QueryError> {
    Insert::into_table("albums")
        .columns(&["title", "artist", "price"])
        .values([
            Value::from(album.title.as_str()),
            Value::from(album.artist.as_str()),
            Value::from(album.price.value()),
        ])
        .suffix("RETURNING id")
        .build()
}

fn album_from_row(row: &PgRow) -> Result<Album, sqlx::Error> {
    let genre_ids: Vec<i64> = row.try_get("genre_ids")?;
    let genre_names: Vec<String> = row.try_get("genre_names")?;

    Ok(Album {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        artist: row.try_get("artist")?,
        price: row.try_get("price")?,
        genres: genre_ids
            .into_iter()
            .zip(genre_names)
            .map(|(id, name)| Genre { id, name })
            .collect(),
    })
}

#[async_trait]
impl AlbumRepository for PgAlbumRepo {
    async fn create(&self, ctx: &Context, album: &NewAlbum) -> Result<AlbumId, RepoError> {
        let stmt = insert_album(album)?;
        let row = Session::resolve(&self.pool, ctx)
            .query_row(&stmt)
            .await
            .map_err(|e| {
                on_unique_violation(e, || RepoError::AlreadyExists {
                    resource: RESOURCE,
                    detail: format!("'{}' by '{}'", album.title.as_str(), album.artist.as_str()),
                })
            })?
            .ok_or(sqlx::Error::RowNotFound)?;

        let id: AlbumId = row.try_get("id")?;
        tracing::debug!(album_id = id, "album inserted");
        Ok(id)
    }

    async fn find_all(&self, ctx: &Context) -> Result<Vec<Album>, RepoError> {
        let stmt = select_with_genres().build()?;
        let rows = Session::resolve(&self.pool, ctx).query(&stmt).await?;

        let albums = rows
            .iter()
            .map(album_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(albums)
    }

    async fn find_by_id(&self, ctx: &Context, id: AlbumId) -> Result<Album, RepoError> {
        let stmt = select_with_genres().filter(eq("a.id", id)).build()?;
        let row = Session::resolve(&self.pool, ctx)
            .query_row(&stmt)
            .await?
            .ok_or(RepoError::NotFound {
                resource: RESOURCE,
                id,
            })?;

        Ok(album_from_row(&row)?)
    }

    async fn delete(&self, ctx: &Context, id: AlbumId) -> Result<(), RepoError> {
        let stmt = Delete::from("albums").filter(eq("id", id)).build()?;
        let affected = Session::resolve(&self.pool, ctx).exec(&stmt).await?;

        if affected == 0 {
            return Err(RepoError::NotFound {
                resource: RESOURCE,
                id,
            });
        }
        tracing::debug!(album_id = id, "album deleted");
        Ok(())
    }
}
