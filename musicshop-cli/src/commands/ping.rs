//! Check database reachability

use anyhow::{Context, Result};
use clap::Parser;
use musicshop_server::db;

use super::{open_pool, DbArgs};

/// Arguments for the ping command
#[derive(Parser, Debug)]
pub struct PingArgs {
    #[command(flatten)]
    pub db: DbArgs,
}

pub async fn run_ping(args: PingArgs) -> Result<()> {
    let config = args.db.load_config()?;
    let pool = open_pool(&config).await?;

    let result = db::ping(&pool).await.context("Ping failed");
    pool.close().await;
    result?;

    println!("Database is up");
    Ok(())
}
