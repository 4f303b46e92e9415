//! In-memory store for service tests
//!
//! Enforces the same constraints as the Postgres schema (unique album
//! title/artist, unique genre name, association foreign keys, cascades)
//! and implements `Transactor` by snapshotting state on entry and
//! restoring it on failure or panic.

use std::collections::{BTreeMap, BTreeSet};
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use futures::FutureExt;

use musicshop_core::{Album, AlbumId, Genre, GenreId, NewAlbum, NewGenre};

use crate::db::{AlbumRepository, Context, DbError, GenreRepository, RepoError, Transactor};

#[derive(Debug, Clone)]
struct AlbumRow {
    title: String,
    artist: String,
    price: f64,
}

#[derive(Debug, Clone, Default)]
struct State {
    albums: BTreeMap<AlbumId, AlbumRow>,
    genres: BTreeMap<GenreId, String>,
    links: BTreeSet<(AlbumId, GenreId)>,
    last_album_id: AlbumId,
    last_genre_id: GenreId,
}

#[derive(Clone, Default)]
pub(crate) struct MemoryStore {
    state: Arc<Mutex<State>>,
    depth: Arc<AtomicUsize>,
    failing: Arc<Mutex<bool>>,
}

impl MemoryStore {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    /// Make every repository call fail with a driver error.
    pub(crate) fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap() = failing;
    }

    fn check(&self, ctx: &Context) -> Result<(), RepoError> {
        if ctx.is_cancelled() {
            return Err(DbError::Cancelled.into());
        }
        if *self.failing.lock().unwrap() {
            return Err(sqlx::Error::PoolTimedOut.into());
        }
        Ok(())
    }

    pub(crate) fn album_count(&self) -> usize {
        self.lock().albums.len()
    }

    pub(crate) fn link_count(&self) -> usize {
        self.lock().links.len()
    }

    fn album(state: &State, id: AlbumId) -> Option<Album> {
        let row = state.albums.get(&id)?;
        let genres = state
            .links
            .iter()
            .filter(|(album_id, _)| *album_id == id)
            .map(|&(_, genre_id)| Genre {
                id: genre_id,
                name: state.genres[&genre_id].clone(),
            })
            .collect();

        Some(Album {
            id,
            title: row.title.clone(),
            artist: row.artist.clone(),
            price: row.price,
            genres,
        })
    }
}

#[async_trait]
impl AlbumRepository for MemoryStore {
    async fn create(&self, ctx: &Context, album: &NewAlbum) -> Result<AlbumId, RepoError> {
        self.check(ctx)?;
        let mut state = self.lock();

        let exists = state
            .albums
            .values()
            .any(|a| a.title == album.title.as_str() && a.artist == album.artist.as_str());
        if exists {
            return Err(RepoError::AlreadyExists {
                resource: "album",
                detail: album.title.as_str().to_owned(),
            });
        }

        state.last_album_id += 1;
        let id = state.last_album_id;
        state.albums.insert(
            id,
            AlbumRow {
                title: album.title.as_str().to_owned(),
                artist: album.artist.as_str().to_owned(),
                price: album.price.value(),
            },
        );
        Ok(id)
    }

    async fn find_all(&self, ctx: &Context) -> Result<Vec<Album>, RepoError> {
        self.check(ctx)?;
        let state = self.lock();
        Ok(state
            .albums
            .keys()
            .filter_map(|&id| Self::album(&state, id))
            .collect())
    }

    async fn find_by_id(&self, ctx: &Context, id: AlbumId) -> Result<Album, RepoError> {
        self.check(ctx)?;
        Self::album(&self.lock(), id).ok_or(RepoError::NotFound {
            resource: "album",
            id,
        })
    }

    async fn delete(&self, ctx: &Context, id: AlbumId) -> Result<(), RepoError> {
        self.check(ctx)?;
        let mut state = self.lock();
        if state.albums.remove(&id).is_none() {
            return Err(RepoError::NotFound {
                resource: "album",
                id,
            });
        }
        state.links.retain(|&(album_id, _)| album_id != id);
        Ok(())
    }
}

#[async_trait]
impl GenreRepository for MemoryStore {
    async fn create(&self, ctx: &Context, genre: &NewGenre) -> Result<GenreId, RepoError> {
        self.check(ctx)?;
        let mut state = self.lock();

        if state.genres.values().any(|name| name == genre.name.as_str()) {
            return Err(RepoError::AlreadyExists {
                resource: "genre",
                detail: genre.name.as_str().to_owned(),
            });
        }

        state.last_genre_id += 1;
        let id = state.last_genre_id;
        state.genres.insert(id, genre.name.as_str().to_owned());
        Ok(id)
    }

    async fn add_associations(
        &self,
        ctx: &Context,
        album_id: AlbumId,
        genre_ids: &[GenreId],
    ) -> Result<(), RepoError> {
        self.check(ctx)?;
        if genre_ids.is_empty() {
            return Ok(());
        }
        let mut state = self.lock();

        // A foreign key violation rejects the whole statement
        let dangling = !state.albums.contains_key(&album_id)
            || genre_ids.iter().any(|id| !state.genres.contains_key(id));
        if dangling {
            return Err(RepoError::ConstraintFailed {
                album_id,
                reason: "unknown album or genre".to_owned(),
            });
        }

        // ON CONFLICT DO NOTHING: duplicates are skipped, the rest land
        let inserted = genre_ids
            .iter()
            .filter(|&&genre_id| state.links.insert((album_id, genre_id)))
            .count();
        if inserted != genre_ids.len() {
            return Err(RepoError::ConstraintFailed {
                album_id,
                reason: format!("{inserted} of {} associations inserted", genre_ids.len()),
            });
        }
        Ok(())
    }

    async fn find_all(&self, ctx: &Context) -> Result<Vec<Genre>, RepoError> {
        self.check(ctx)?;
        Ok(self
            .lock()
            .genres
            .iter()
            .map(|(&id, name)| Genre {
                id,
                name: name.clone(),
            })
            .collect())
    }

    async fn delete(&self, ctx: &Context, id: GenreId) -> Result<(), RepoError> {
        self.check(ctx)?;
        let mut state = self.lock();
        if state.genres.remove(&id).is_none() {
            return Err(RepoError::NotFound {
                resource: "genre",
                id,
            });
        }
        state.links.retain(|&(_, genre_id)| genre_id != id);
        Ok(())
    }
}

#[async_trait]
impl Transactor for MemoryStore {
    async fn run<T, E, F, Fut>(&self, ctx: &Context, f: F) -> Result<T, E>
    where
        T: Send,
        E: From<DbError> + Send,
        F: FnOnce(Context) -> Fut + Send,
        Fut: Future<Output = Result<T, E>> + Send,
    {
        if self.depth.fetch_add(1, Ordering::SeqCst) > 0 {
            let out = f(ctx.clone()).await;
            self.depth.fetch_sub(1, Ordering::SeqCst);
            return out;
        }

        let snapshot = self.lock().clone();
        let outcome = AssertUnwindSafe(ctx.guard(f(ctx.clone())))
            .catch_unwind()
            .await;
        self.depth.fetch_sub(1, Ordering::SeqCst);

        match outcome {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => {
                *self.lock() = snapshot;
                Err(err)
            }
            Err(panic) => {
                *self.lock() = snapshot;
                std::panic::resume_unwind(panic)
            }
        }
    }
}
