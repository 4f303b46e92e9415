//! Storage error taxonomy
//!
//! `DbError` is what the driver layer produces. `RepoError` is what
//! repositories report: constraint outcomes are classified into their
//! own variants, everything else stays wrapped as `Storage`.

use super::query::QueryError;

/// Driver-level failure
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("statement build failed: {0}")]
    Query(#[from] QueryError),

    /// The transaction behind a context was already committed or rolled back
    #[error("transaction already closed")]
    TransactionClosed,

    #[error("operation cancelled")]
    Cancelled,

    #[error("operation deadline exceeded")]
    DeadlineExceeded,
}

impl DbError {
    /// Unique constraint rejected the write (SQLSTATE 23505).
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::Sqlx(sqlx::Error::Database(e)) if e.is_unique_violation())
    }

    /// Foreign key constraint rejected the write (SQLSTATE 23503).
    pub fn is_foreign_key_violation(&self) -> bool {
        matches!(self, Self::Sqlx(sqlx::Error::Database(e)) if e.is_foreign_key_violation())
    }

    /// The caller gave up: cancellation or an expired deadline.
    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Cancelled | Self::DeadlineExceeded)
    }
}

/// Repository-level failure
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("{resource} already exists: {detail}")]
    AlreadyExists {
        resource: &'static str,
        detail: String,
    },

    #[error("{resource} '{id}' not found")]
    NotFound { resource: &'static str, id: i64 },

    /// Bulk association insert did not land every requested row
    #[error("album {album_id}: cannot add genre associations: {reason}")]
    ConstraintFailed { album_id: i64, reason: String },

    #[error(transparent)]
    Storage(#[from] DbError),
}

impl From<sqlx::Error> for RepoError {
    fn from(e: sqlx::Error) -> Self {
        Self::Storage(DbError::Sqlx(e))
    }
}

impl From<QueryError> for RepoError {
    fn from(e: QueryError) -> Self {
        Self::Storage(DbError::Query(e))
    }
}
