//! musicshop CLI - album/genre catalog service
//!
//! - `serve`: run the HTTP API (connects with retry, applies migrations)
//! - `migrate`: apply the schema and exit
//! - `ping`: check that the database is reachable

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod tracing_setup;

use commands::migrate::MigrateArgs;
use commands::ping::PingArgs;
use commands::serve::ServeArgs;
use commands::DbArgs;
use tracing_setup::TracingConfig;

#[derive(Parser, Debug)]
#[command(
    name = "musicshop",
    author,
    version,
    about = "Album and genre catalog service backed by PostgreSQL"
)]
struct Cli {
    /// Enable debug logging (RUST_LOG still wins)
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve(ServeArgs),
    /// Create tables and indexes, then exit
    Migrate(MigrateArgs),
    /// Connect (with retry) and report database liveness
    Ping(PingArgs),
}

impl Commands {
    fn db_args(&self) -> &DbArgs {
        match self {
            Self::Serve(args) => &args.db,
            Self::Migrate(args) => &args.db,
            Self::Ping(args) => &args.db,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Only the log level is needed here; each command loads the full config
    let level = cli
        .command
        .db_args()
        .load_config()
        .map(|config| config.log.level)
        .unwrap_or_else(|_| "info".to_string());

    tracing_setup::init(&TracingConfig {
        debug: cli.debug,
        level,
    })?;

    match cli.command {
        Commands::Serve(args) => commands::run_serve(args).await?,
        Commands::Migrate(args) => commands::run_migrate(args).await?,
        Commands::Ping(args) => commands::run_ping(args).await?,
    }
    Ok(())
}
