//! Database migrations for catalog tables

use sqlx::PgPool;

use super::error::DbError;

const STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS albums (
        id BIGSERIAL PRIMARY KEY,
        title TEXT NOT NULL,
        artist TEXT NOT NULL,
        price NUMERIC(10, 2) NOT NULL CHECK (price >= 0),
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        CONSTRAINT albums_title_artist_key UNIQUE (title, artist)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_albums_artist ON albums(artist)",
    "CREATE INDEX IF NOT EXISTS idx_albums_price ON albums(price)",
    r#"
    CREATE TABLE IF NOT EXISTS genres (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL UNIQUE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS album_genres (
        album_id BIGINT NOT NULL REFERENCES albums(id) ON DELETE CASCADE,
        genre_id BIGINT NOT NULL REFERENCES genres(id) ON DELETE CASCADE,
        PRIMARY KEY (album_id, genre_id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_album_genres_genre ON album_genres(genre_id)",
];

/// Create the catalog schema. Safe to run repeatedly.
pub async fn run(pool: &PgPool) -> Result<(), DbError> {
    tracing::info!("Running catalog migrations...");

    let mut tx = pool.begin().await?;
    for sql in STATEMENTS {
        sqlx::query(sql).execute(&mut *tx).await?;
    }
    tx.commit().await?;

    tracing::info!(statements = STATEMENTS.len(), "Catalog migrations complete");
    Ok(())
}
