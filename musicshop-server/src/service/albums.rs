use musicshop_core::{Album, AlbumId, GenreId, NewAlbum};

use super::{CatalogService, ServiceError};
use crate::db::{AlbumRepository, Context, GenreRepository, RepoError, Transactor};

impl<A, G, T> CatalogService<A, G, T>
where
    A: AlbumRepository,
    G: GenreRepository,
    T: Transactor,
{
    /// Insert an album and all of its genre associations as one unit.
    ///
    /// Either the album and every requested association exist afterwards,
    /// or none of them do.
    pub async fn create_album(&self, ctx: &Context, album: NewAlbum) -> Result<AlbumId, ServiceError> {
        let albums = &self.albums;
        let genres = &self.genres;

        let created = self
            .transactor
            .run(ctx, |tx| async move {
                let id = albums.create(&tx, &album).await?;
                if !album.genre_ids.is_empty() {
                    genres.add_associations(&tx, id, &album.genre_ids).await?;
                }
                Ok::<_, RepoError>(id)
            })
            .await;

        match created {
            Ok(id) => {
                tracing::info!(album_id = id, "album created");
                Ok(id)
            }
            Err(RepoError::AlreadyExists { .. }) => Err(ServiceError::AlbumAlreadyExists),
            Err(RepoError::ConstraintFailed { album_id, reason }) => {
                tracing::warn!(album_id, %reason, "album genres rejected");
                Err(ServiceError::GenreNotExists)
            }
            Err(e) => {
                tracing::error!(error = %e, "cannot create album");
                Err(ServiceError::CannotCreateAlbum)
            }
        }
    }

    pub async fn list_albums(&self, ctx: &Context) -> Result<Vec<Album>, ServiceError> {
        self.albums.find_all(ctx).await.map_err(|e| {
            tracing::error!(error = %e, "cannot fetch albums");
            ServiceError::CannotFetchAlbums
        })
    }

    pub async fn get_album(&self, ctx: &Context, id: AlbumId) -> Result<Album, ServiceError> {
        self.albums.find_by_id(ctx, id).await.map_err(|e| match e {
            RepoError::NotFound { .. } => ServiceError::AlbumNotFound,
            e => {
                tracing::error!(album_id = id, error = %e, "cannot fetch album");
                ServiceError::CannotFetchAlbum
            }
        })
    }

    pub async fn delete_album(&self, ctx: &Context, id: AlbumId) -> Result<(), ServiceError> {
        self.albums.delete(ctx, id).await.map_err(|e| match e {
            RepoError::NotFound { .. } => ServiceError::AlbumNotFound,
            e => {
                tracing::error!(album_id = id, error = %e, "cannot delete album");
                ServiceError::CannotDeleteAlbum
            }
        })?;
        tracing::info!(album_id = id, "album deleted");
        Ok(())
    }

    /// Associate an existing album with more genres, all or nothing.
    pub async fn add_genres_to_album(
        &self,
        ctx: &Context,
        album_id: AlbumId,
        genre_ids: Vec<GenreId>,
    ) -> Result<(), ServiceError> {
        let albums = &self.albums;
        let genres = &self.genres;

        let added = self
            .transactor
            .run(ctx, |tx| async move {
                albums.find_by_id(&tx, album_id).await?;
                genres.add_associations(&tx, album_id, &genre_ids).await
            })
            .await;

        added.map_err(|e| match e {
            RepoError::NotFound { .. } => ServiceError::AlbumNotFound,
            RepoError::ConstraintFailed { reason, .. } => {
                tracing::warn!(album_id, %reason, "album genres rejected");
                ServiceError::GenreNotExists
            }
            e => {
                tracing::error!(album_id, error = %e, "cannot add genres to album");
                ServiceError::CannotAddGenres
            }
        })
    }
}
