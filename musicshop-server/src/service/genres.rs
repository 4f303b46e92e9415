use musicshop_core::{Genre, GenreId, NewGenre};

use super::{CatalogService, ServiceError};
use crate::db::{AlbumRepository, Context, GenreRepository, RepoError, Transactor};

impl<A, G, T> CatalogService<A, G, T>
where
    A: AlbumRepository,
    G: GenreRepository,
    T: Transactor,
{
    pub async fn create_genre(&self, ctx: &Context, genre: NewGenre) -> Result<GenreId, ServiceError> {
        match self.genres.create(ctx, &genre).await {
            Ok(id) => {
                tracing::info!(genre_id = id, name = genre.name.as_str(), "genre created");
                Ok(id)
            }
            Err(RepoError::AlreadyExists { .. }) => Err(ServiceError::GenreAlreadyExists),
            Err(e) => {
                tracing::error!(error = %e, "cannot create genre");
                Err(ServiceError::CannotCreateGenre)
            }
        }
    }

    pub async fn list_genres(&self, ctx: &Context) -> Result<Vec<Genre>, ServiceError> {
        self.genres.find_all(ctx).await.map_err(|e| {
            tracing::error!(error = %e, "cannot fetch genres");
            ServiceError::CannotFetchGenres
        })
    }

    /// Delete a genre; albums lose the association, not the album.
    pub async fn delete_genre(&self, ctx: &Context, id: GenreId) -> Result<(), ServiceError> {
        self.genres.delete(ctx, id).await.map_err(|e| match e {
            RepoError::NotFound { .. } => ServiceError::GenreNotFound,
            e => {
                tracing::error!(genre_id = id, error = %e, "cannot delete genre");
                ServiceError::CannotDeleteGenre
            }
        })?;
        tracing::info!(genre_id = id, "genre deleted");
        Ok(())
    }
}
