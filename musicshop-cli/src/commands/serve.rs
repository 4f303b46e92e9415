//! HTTP server command
//!
//! Connects (with retry), applies migrations, then serves the catalog API
//! until Ctrl+C or SIGTERM. The pool is closed once, after shutdown.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;

use musicshop_server::db::migrations;
use musicshop_server::http::{run_server, ServerConfig};

use super::{open_pool, DbArgs};

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    #[command(flatten)]
    pub db: DbArgs,

    /// Address to bind to (default: [http] host:port from config, 127.0.0.1:8080)
    #[arg(long, short = 'b')]
    pub bind: Option<SocketAddr>,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let config = args.db.load_config()?;

    let mut server_config = ServerConfig::from_http(&config.http).context("Invalid [http] config")?;
    if let Some(bind) = args.bind {
        server_config.bind_addr = bind;
    }
    server_config.cors_permissive |= args.cors_permissive;

    tracing::info!(
        app = %config.app.name,
        version = %config.app.version,
        bind = %server_config.bind_addr,
        "Starting musicshop server"
    );

    let pool = open_pool(&config).await?;

    if let Err(e) = migrations::run(&pool).await {
        pool.close().await;
        return Err(e).context("Migrations failed");
    }

    // Blocks until shutdown
    let result = run_server(pool.clone(), server_config, CancellationToken::new()).await;

    pool.close().await;
    tracing::info!("Database pool closed");

    result.context("Server error")
}
