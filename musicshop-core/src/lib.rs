//! musicshop-core: catalog entities and configuration
//!
//! Shared by the server and the CLI:
//! - `entity`: albums, genres and the validated inputs used to create them
//! - `validation`: the error returned when input is rejected
//! - `config`: `ShopConfig` loading (TOML file, `.env`, environment overrides)

pub mod config;
pub mod entity;
pub mod error;
pub mod validation;

pub use config::{AppConfig, HttpConfig, LogConfig, PostgresConfig, ShopConfig};
pub use entity::{
    Album, AlbumId, AlbumTitle, ArtistName, Genre, GenreId, GenreName, NewAlbum, NewGenre, Price,
};
pub use error::{ConfigError, Result};
pub use validation::ValidationError;
