//! Subcommand implementations

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use musicshop_core::ShopConfig;
use musicshop_server::db::{connect, PgPool, PoolSettings};

pub mod migrate;
pub mod ping;
pub mod serve;

pub use migrate::run_migrate;
pub use ping::run_ping;
pub use serve::run_serve;

/// Options shared by every subcommand that talks to the database
#[derive(Args, Debug, Clone, Default)]
pub struct DbArgs {
    /// Config file (default: ~/.musicshop/config.toml)
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Database URL (overrides config and environment)
    #[arg(long, value_name = "URL")]
    pub database_url: Option<String>,
}

impl DbArgs {
    /// Load config, then apply command-line overrides.
    pub fn load_config(&self) -> Result<ShopConfig> {
        let mut config = ShopConfig::load(self.config.as_deref()).context("Failed to load configuration")?;
        if let Some(url) = &self.database_url {
            config.postgres.url = url.clone();
        }
        Ok(config)
    }
}

/// Connect with retry; running out of attempts is fatal.
async fn open_pool(config: &ShopConfig) -> Result<PgPool> {
    let settings = PoolSettings::from(&config.postgres);
    tracing::info!(
        max_connections = settings.max_connections,
        max_attempts = settings.max_attempts,
        "Connecting to database"
    );
    connect(&settings)
        .await
        .context("Database connection failed")
}
