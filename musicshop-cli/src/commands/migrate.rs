//! Apply the catalog schema and exit

use anyhow::{Context, Result};
use clap::Parser;
use musicshop_server::db::migrations;

use super::{open_pool, DbArgs};

/// Arguments for the migrate command
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    #[command(flatten)]
    pub db: DbArgs,
}

pub async fn run_migrate(args: MigrateArgs) -> Result<()> {
    let config = args.db.load_config()?;
    let pool = open_pool(&config).await?;

    let result = migrations::run(&pool).await.context("Migrations failed");
    pool.close().await;
    result?;

    println!("Migrations applied");
    Ok(())
}
