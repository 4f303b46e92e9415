//! musicshop-server: album/genre catalog over PostgreSQL
//!
//! - `db`: connection manager, statement builder, transactions, repositories
//! - `service`: `CatalogService`, the transactional write path and error mapping
//! - `http`: axum routes, JSON errors, server lifecycle

pub mod db;
pub mod http;
pub mod service;

pub use db::{connect, ping, ConnectError, Context, PoolSettings};
pub use http::{build_router, run_server, AppState, ServerConfig, ServerError};
pub use service::{CatalogService, PgCatalogService, ServiceError};
