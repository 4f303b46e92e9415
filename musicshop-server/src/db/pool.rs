//! Database connection pool management
//!
//! Opens a sqlx `PgPool`, probes it with a ping, and retries with a fixed
//! delay until the configured number of attempts is used up. Running out
//! of attempts is fatal for the caller.

use std::future::Future;
use std::time::Duration;

use musicshop_core::PostgresConfig;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Connection, PgPool};

/// Connection settings for [`connect`]
#[derive(Debug, Clone)]
pub struct PoolSettings {
    pub url: String,
    pub max_connections: u32,
    pub max_attempts: u32,
    pub retry_delay: Duration,
    pub connect_timeout: Duration,
}

impl From<&PostgresConfig> for PoolSettings {
    fn from(config: &PostgresConfig) -> Self {
        Self {
            url: config.url.clone(),
            max_connections: config.max_connections,
            max_attempts: config.connect_attempts,
            retry_delay: config.retry_delay(),
            connect_timeout: config.connect_timeout(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error("invalid connection settings: {0}")]
    InvalidSettings(&'static str),

    #[error("failed to connect to database after {attempts} attempts: {source}")]
    Exhausted {
        attempts: u32,
        #[source]
        source: sqlx::Error,
    },
}

/// Create a PostgreSQL connection pool, retrying on failure.
///
/// # Errors
///
/// Returns `ConnectError::Exhausted` once `max_attempts` attempts have
/// failed.
///
/// # Example
///
/// ```ignore
/// let pool = connect(&PoolSettings::from(&config.postgres)).await?;
/// ```
pub async fn connect(settings: &PoolSettings) -> Result<PgPool, ConnectError> {
    retry_connect(settings.max_attempts, settings.retry_delay, |_| {
        open_pool(settings)
    })
    .await
}

/// Drive `attempt` until it succeeds or `max_attempts` attempts have failed,
/// sleeping `retry_delay` between attempts. Attempts are numbered from 1.
pub async fn retry_connect<T, F, Fut>(
    max_attempts: u32,
    retry_delay: Duration,
    mut attempt: F,
) -> Result<T, ConnectError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, sqlx::Error>>,
{
    if max_attempts == 0 {
        return Err(ConnectError::InvalidSettings("max_attempts must be at least 1"));
    }

    let mut n = 1;
    loop {
        match attempt(n).await {
            Ok(value) => {
                tracing::info!(attempt = n, "connected to database");
                return Ok(value);
            }
            Err(source) if n >= max_attempts => {
                tracing::error!(attempt = n, max_attempts, error = %source, "giving up on database connection");
                return Err(ConnectError::Exhausted {
                    attempts: n,
                    source,
                });
            }
            Err(e) => {
                tracing::warn!(
                    attempt = n,
                    max_attempts,
                    error = %e,
                    "failed to connect to database, retrying in {:?}",
                    retry_delay
                );
                tokio::time::sleep(retry_delay).await;
                n += 1;
            }
        }
    }
}

async fn open_pool(settings: &PoolSettings) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(settings.connect_timeout)
        .connect(&settings.url)
        .await?;

    if let Err(e) = ping(&pool).await {
        pool.close().await;
        return Err(e);
    }
    Ok(pool)
}

/// Liveness probe: check out a connection and ping the server.
pub async fn ping(pool: &PgPool) -> Result<(), sqlx::Error> {
    let mut conn = pool.acquire().await?;
    conn.ping().await
}
