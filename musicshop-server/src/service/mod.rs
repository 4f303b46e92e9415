//! Catalog service
//!
//! The only entry point HTTP handlers use. Writes that touch more than one
//! table run inside `Transactor::run`; every repository failure is mapped
//! exactly once into a [`ServiceError`], and storage detail stops here
//! (it is logged, not returned).

use sqlx::PgPool;

use crate::db::{AlbumRepository, GenreRepository, PgAlbumRepo, PgGenreRepo, PgTransactor, Transactor};

mod albums;
mod genres;

#[cfg(test)]
mod memory;

/// Domain-level failure. Carries no storage cause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    #[error("album already exists")]
    AlbumAlreadyExists,

    #[error("album not found")]
    AlbumNotFound,

    #[error("genre already exists")]
    GenreAlreadyExists,

    #[error("genre not found")]
    GenreNotFound,

    /// An association referred to a genre (or album) that does not exist
    #[error("one or more genres do not exist")]
    GenreNotExists,

    #[error("cannot create album")]
    CannotCreateAlbum,

    #[error("cannot fetch albums")]
    CannotFetchAlbums,

    #[error("cannot fetch album")]
    CannotFetchAlbum,

    #[error("cannot delete album")]
    CannotDeleteAlbum,

    #[error("cannot create genre")]
    CannotCreateGenre,

    #[error("cannot fetch genres")]
    CannotFetchGenres,

    #[error("cannot delete genre")]
    CannotDeleteGenre,

    #[error("cannot add genres to album")]
    CannotAddGenres,
}

pub struct CatalogService<A, G, T> {
    albums: A,
    genres: G,
    transactor: T,
}

/// The service as wired in production
pub type PgCatalogService = CatalogService<PgAlbumRepo, PgGenreRepo, PgTransactor>;

impl<A, G, T> CatalogService<A, G, T>
where
    A: AlbumRepository,
    G: GenreRepository,
    T: Transactor,
{
    pub fn new(albums: A, genres: G, transactor: T) -> Self {
        Self {
            albums,
            genres,
            transactor,
        }
    }
}

impl PgCatalogService {
    /// Wire the Postgres repositories and transactor over one pool.
    pub fn from_pool(pool: PgPool) -> Self {
        Self::new(
            PgAlbumRepo::new(pool.clone()),
            PgGenreRepo::new(pool.clone()),
            PgTransactor::new(pool),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::memory::MemoryStore;
    use super::*;
    use crate::db::{Context, RepoError};
    use musicshop_core::{NewAlbum, NewGenre};

    type TestService = CatalogService<MemoryStore, MemoryStore, MemoryStore>;

    fn service() -> (TestService, MemoryStore) {
        let store = MemoryStore::default();
        let svc = CatalogService::new(store.clone(), store.clone(), store.clone());
        (svc, store)
    }

    fn album(title: &str, genre_ids: Vec<i64>) -> NewAlbum {
        NewAlbum::new(title, "Artist A", 9.99, genre_ids).unwrap()
    }

    async fn genre(svc: &TestService, name: &str) -> i64 {
        svc.create_genre(&Context::background(), NewGenre::new(name).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn create_album_with_genres() {
        let (svc, _) = service();
        let ctx = Context::background();
        let jazz = genre(&svc, "jazz").await;
        let bop = genre(&svc, "bebop").await;

        let id = svc.create_album(&ctx, album("Title A", vec![bop, jazz])).await.unwrap();

        let stored = svc.get_album(&ctx, id).await.unwrap();
        assert_eq!(stored.title, "Title A");
        let ids: Vec<_> = stored.genres.iter().map(|g| g.id).collect();
        assert_eq!(ids, vec![jazz, bop]);
    }

    #[tokio::test]
    async fn unknown_genre_leaves_nothing_behind() {
        let (svc, store) = service();
        let ctx = Context::background();
        let jazz = genre(&svc, "jazz").await;

        let err = svc
            .create_album(&ctx, album("Title A", vec![jazz, 9999]))
            .await
            .unwrap_err();

        assert_eq!(err, ServiceError::GenreNotExists);
        assert_eq!(store.album_count(), 0);
        assert_eq!(store.link_count(), 0);
    }

    #[tokio::test]
    async fn duplicate_genre_in_request_rolls_back() {
        let (svc, store) = service();
        let ctx = Context::background();
        let jazz = genre(&svc, "jazz").await;

        let err = svc
            .create_album(&ctx, album("Title A", vec![jazz, jazz]))
            .await
            .unwrap_err();

        assert_eq!(err, ServiceError::GenreNotExists);
        assert_eq!(store.album_count(), 0);
        assert_eq!(store.link_count(), 0);
    }

    #[tokio::test]
    async fn duplicate_album_is_rejected_once() {
        let (svc, store) = service();
        let ctx = Context::background();

        svc.create_album(&ctx, album("Title A", vec![])).await.unwrap();
        let err = svc.create_album(&ctx, album("Title A", vec![])).await.unwrap_err();

        assert_eq!(err, ServiceError::AlbumAlreadyExists);
        assert_eq!(store.album_count(), 1);
    }

    #[tokio::test]
    async fn missing_album_is_not_found() {
        let (svc, _) = service();
        let ctx = Context::background();

        assert_eq!(svc.get_album(&ctx, 999).await.unwrap_err(), ServiceError::AlbumNotFound);
        assert_eq!(svc.delete_album(&ctx, 999).await.unwrap_err(), ServiceError::AlbumNotFound);
        assert_eq!(svc.delete_genre(&ctx, 999).await.unwrap_err(), ServiceError::GenreNotFound);
    }

    #[tokio::test]
    async fn reads_are_repeatable() {
        let (svc, _) = service();
        let ctx = Context::background();
        let jazz = genre(&svc, "jazz").await;
        svc.create_album(&ctx, album("Title A", vec![jazz])).await.unwrap();
        svc.create_album(&ctx, album("Title B", vec![])).await.unwrap();

        let first = svc.list_albums(&ctx).await.unwrap();
        let second = svc.list_albums(&ctx).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
        assert!(first[1].genres.is_empty());
    }

    #[tokio::test]
    async fn deleting_album_cascades_to_associations() {
        let (svc, store) = service();
        let ctx = Context::background();
        let g1 = genre(&svc, "jazz").await;
        let a1 = svc.create_album(&ctx, album("Title A", vec![g1])).await.unwrap();

        svc.delete_album(&ctx, a1).await.unwrap();

        assert_eq!(store.link_count(), 0);
        let genres = svc.list_genres(&ctx).await.unwrap();
        assert_eq!(genres.len(), 1);
        assert_eq!(genres[0].id, g1);
    }

    #[tokio::test]
    async fn deleting_genre_detaches_it_from_albums() {
        let (svc, _) = service();
        let ctx = Context::background();
        let g1 = genre(&svc, "jazz").await;
        let a1 = svc.create_album(&ctx, album("Title A", vec![g1])).await.unwrap();

        svc.delete_genre(&ctx, g1).await.unwrap();

        assert!(svc.get_album(&ctx, a1).await.unwrap().genres.is_empty());
    }

    #[tokio::test]
    async fn add_genres_is_all_or_nothing() {
        let (svc, store) = service();
        let ctx = Context::background();
        let g1 = genre(&svc, "jazz").await;
        let a1 = svc.create_album(&ctx, album("Title A", vec![])).await.unwrap();

        let err = svc.add_genres_to_album(&ctx, a1, vec![g1, 9999]).await.unwrap_err();

        assert_eq!(err, ServiceError::GenreNotExists);
        assert_eq!(store.link_count(), 0);

        svc.add_genres_to_album(&ctx, a1, vec![g1]).await.unwrap();
        assert_eq!(svc.get_album(&ctx, a1).await.unwrap().genres.len(), 1);
    }

    #[tokio::test]
    async fn add_genres_to_missing_album() {
        let (svc, _) = service();
        let g1 = genre(&svc, "jazz").await;

        let err = svc
            .add_genres_to_album(&Context::background(), 42, vec![g1])
            .await
            .unwrap_err();
        assert_eq!(err, ServiceError::AlbumNotFound);
    }

    #[tokio::test]
    async fn duplicate_genre_name() {
        let (svc, _) = service();
        genre(&svc, "jazz").await;

        let err = svc
            .create_genre(&Context::background(), NewGenre::new("jazz").unwrap())
            .await
            .unwrap_err();
        assert_eq!(err, ServiceError::GenreAlreadyExists);
    }

    #[tokio::test]
    async fn storage_failures_become_generic_errors() {
        let (svc, store) = service();
        let ctx = Context::background();
        store.set_failing(true);

        assert_eq!(
            svc.create_album(&ctx, album("Title A", vec![])).await.unwrap_err(),
            ServiceError::CannotCreateAlbum
        );
        assert_eq!(svc.list_albums(&ctx).await.unwrap_err(), ServiceError::CannotFetchAlbums);
        assert_eq!(svc.get_album(&ctx, 1).await.unwrap_err(), ServiceError::CannotFetchAlbum);
        assert_eq!(svc.delete_album(&ctx, 1).await.unwrap_err(), ServiceError::CannotDeleteAlbum);
        assert_eq!(
            svc.create_genre(&ctx, NewGenre::new("jazz").unwrap()).await.unwrap_err(),
            ServiceError::CannotCreateGenre
        );
        assert_eq!(svc.list_genres(&ctx).await.unwrap_err(), ServiceError::CannotFetchGenres);
        assert_eq!(svc.delete_genre(&ctx, 1).await.unwrap_err(), ServiceError::CannotDeleteGenre);
        assert_eq!(
            svc.add_genres_to_album(&ctx, 1, vec![1]).await.unwrap_err(),
            ServiceError::CannotAddGenres
        );
    }

    #[tokio::test]
    async fn cancellation_inside_scope_rolls_back() {
        let store = MemoryStore::default();
        let ctx = Context::background();
        let writer = store.clone();

        let result: Result<(), RepoError> = store
            .run(&ctx, |tx| async move {
                AlbumRepository::create(&writer, &tx, &album("Title A", vec![])).await?;
                tx.cancel();
                AlbumRepository::find_all(&writer, &tx).await?;
                Ok(())
            })
            .await;

        assert!(matches!(result, Err(RepoError::Storage(e)) if e.is_aborted()));
        assert_eq!(store.album_count(), 0);
    }

    #[tokio::test]
    async fn nested_scope_is_rolled_back_by_outer_failure() {
        let store = MemoryStore::default();
        let ctx = Context::background();
        let outer = store.clone();

        let result: Result<(), RepoError> = store
            .run(&ctx, |tx| async move {
                let inner = outer.clone();
                outer
                    .run(&tx, |tx| async move {
                        AlbumRepository::create(&inner, &tx, &album("Title A", vec![])).await
                    })
                    .await?;
                Err(RepoError::NotFound {
                    resource: "album",
                    id: 0,
                })
            })
            .await;

        assert!(result.is_err());
        assert_eq!(store.album_count(), 0);
    }

    #[tokio::test]
    async fn panic_inside_scope_rolls_back_and_resumes() {
        let store = MemoryStore::default();
        let writer = store.clone();
        let runner = store.clone();

        let handle = tokio::spawn(async move {
            let ctx = Context::background();
            let _: Result<(), RepoError> = runner
                .run(&ctx, |tx| async move {
                    AlbumRepository::create(&writer, &tx, &album("Title A", vec![])).await?;
                    panic!("boom");
                })
                .await;
        });

        let err = handle.await.unwrap_err();
        assert!(err.is_panic());
        assert_eq!(store.album_count(), 0);
    }
}
