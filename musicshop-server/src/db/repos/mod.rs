//! Repository traits and their Postgres implementations
//!
//! Each repository follows these patterns:
//! - Uses JOINs for list operations (no N+1)
//! - Relies on DB constraints and classifies the violation (no check-then-insert)
//! - Runs on whatever executor the `Context` resolves to

use async_trait::async_trait;
use musicshop_core::{Album, AlbumId, Genre, GenreId, NewAlbum, NewGenre};

use super::context::Context;
use super::error::{DbError, RepoError};

pub mod albums;
pub mod genres;

pub use albums::PgAlbumRepo;
pub use genres::PgGenreRepo;

#[async_trait]
pub trait AlbumRepository: Send + Sync {
    /// Insert an album row and return its id. Genres are not touched.
    async fn create(&self, ctx: &Context, album: &NewAlbum) -> Result<AlbumId, RepoError>;

    async fn find_all(&self, ctx: &Context) -> Result<Vec<Album>, RepoError>;

    async fn find_by_id(&self, ctx: &Context, id: AlbumId) -> Result<Album, RepoError>;

    async fn delete(&self, ctx: &Context, id: AlbumId) -> Result<(), RepoError>;
}

#[async_trait]
pub trait GenreRepository: Send + Sync {
    async fn create(&self, ctx: &Context, genre: &NewGenre) -> Result<GenreId, RepoError>;

    /// Link `album_id` to every genre in `genre_ids` with one statement.
    ///
    /// Anything short of every requested row landing is `ConstraintFailed`.
    async fn add_associations(
        &self,
        ctx: &Context,
        album_id: AlbumId,
        genre_ids: &[GenreId],
    ) -> Result<(), RepoError>;

    async fn find_all(&self, ctx: &Context) -> Result<Vec<Genre>, RepoError>;

    async fn delete(&self, ctx: &Context, id: GenreId) -> Result<(), RepoError>;
}

/// Turn a unique violation into the error built by `conflict`; anything
/// else stays a storage error.
fn on_unique_violation(err: DbError, conflict: impl FnOnce() -> RepoError) -> RepoError {
    if err.is_unique_violation() {
        conflict()
    } else {
        RepoError::Storage(err)
    }
}
