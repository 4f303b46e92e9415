//! Database layer - connection pool, statements, transactions and repositories
//!
//! # Design Principles
//!
//! - One shared `PgPool`, established with retry
//! - All list operations use JOINs - no N+1 queries
//! - Rely on DB constraints, classify conflicts - no check-then-insert
//! - Multi-step writes run inside `Transactor::run`

pub mod context;
pub mod error;
pub mod executor;
pub mod migrations;
pub mod pool;
pub mod query;
pub mod repos;
pub mod transactor;

pub use context::Context;
pub use error::{DbError, RepoError};
pub use executor::{Querier, Session, TxHandle};
pub use pool::{connect, ping, ConnectError, PoolSettings};
pub use repos::{AlbumRepository, GenreRepository, PgAlbumRepo, PgGenreRepo};
pub use transactor::{PgTransactor, Transactor};

pub use sqlx::PgPool;
