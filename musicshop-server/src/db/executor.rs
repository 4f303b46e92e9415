//! Executor selection
//!
//! `Querier` is the minimal surface repositories need. The pool and a
//! transaction handle both implement it; `Session` picks one based on the
//! `Context` and applies the context's cancellation and deadline to every
//! call.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Transaction};
use tokio::sync::Mutex;

use super::context::Context;
use super::error::DbError;
use super::query::Statement;

/// Query / QueryRow / Exec over some Postgres executor
#[async_trait]
pub trait Querier: Send + Sync {
    async fn query(&self, stmt: &Statement) -> Result<Vec<PgRow>, DbError>;

    async fn query_row(&self, stmt: &Statement) -> Result<Option<PgRow>, DbError>;

    /// Execute and return the number of affected rows.
    async fn exec(&self, stmt: &Statement) -> Result<u64, DbError>;
}

#[async_trait]
impl Querier for PgPool {
    async fn query(&self, stmt: &Statement) -> Result<Vec<PgRow>, DbError> {
        Ok(stmt.to_query().fetch_all(self).await?)
    }

    async fn query_row(&self, stmt: &Statement) -> Result<Option<PgRow>, DbError> {
        Ok(stmt.to_query().fetch_optional(self).await?)
    }

    async fn exec(&self, stmt: &Statement) -> Result<u64, DbError> {
        Ok(stmt.to_query().execute(self).await?.rows_affected())
    }
}

/// An open transaction shared by every call inside one scope.
///
/// The mutex serializes statements on the single transaction connection.
/// `commit`/`rollback` take the transaction out; later use fails with
/// `DbError::TransactionClosed`.
pub struct TxHandle {
    tx: Mutex<Option<Transaction<'static, Postgres>>>,
}

impl TxHandle {
    pub(crate) fn new(tx: Transaction<'static, Postgres>) -> Self {
        Self {
            tx: Mutex::new(Some(tx)),
        }
    }

    pub(crate) async fn commit(&self) -> Result<(), DbError> {
        let tx = self.tx.lock().await.take().ok_or(DbError::TransactionClosed)?;
        tx.commit().await?;
        Ok(())
    }

    pub(crate) async fn rollback(&self) -> Result<(), DbError> {
        let tx = self.tx.lock().await.take().ok_or(DbError::TransactionClosed)?;
        tx.rollback().await?;
        Ok(())
    }
}

#[async_trait]
impl Querier for TxHandle {
    async fn query(&self, stmt: &Statement) -> Result<Vec<PgRow>, DbError> {
        let mut guard = self.tx.lock().await;
        let tx = guard.as_mut().ok_or(DbError::TransactionClosed)?;
        Ok(stmt.to_query().fetch_all(&mut **tx).await?)
    }

    async fn query_row(&self, stmt: &Statement) -> Result<Option<PgRow>, DbError> {
        let mut guard = self.tx.lock().await;
        let tx = guard.as_mut().ok_or(DbError::TransactionClosed)?;
        Ok(stmt.to_query().fetch_optional(&mut **tx).await?)
    }

    async fn exec(&self, stmt: &Statement) -> Result<u64, DbError> {
        let mut guard = self.tx.lock().await;
        let tx = guard.as_mut().ok_or(DbError::TransactionClosed)?;
        Ok(stmt.to_query().execute(&mut **tx).await?.rows_affected())
    }
}

/// The executor a repository call runs on, bound to its context
pub struct Session<'c> {
    querier: &'c dyn Querier,
    ctx: &'c Context,
}

impl<'c> Session<'c> {
    /// Use the context's transaction if there is one, otherwise the pool.
    pub fn resolve(pool: &'c PgPool, ctx: &'c Context) -> Self {
        let querier: &'c dyn Querier = match ctx.transaction() {
            Some(tx) => tx,
            None => pool,
        };
        Self { querier, ctx }
    }

    pub fn in_transaction(&self) -> bool {
        self.ctx.in_transaction()
    }

    pub async fn query(&self, stmt: &Statement) -> Result<Vec<PgRow>, DbError> {
        tracing::trace!(sql = stmt.sql(), tx = self.in_transaction(), "query");
        self.ctx.guard(self.querier.query(stmt)).await
    }

    pub async fn query_row(&self, stmt: &Statement) -> Result<Option<PgRow>, DbError> {
        tracing::trace!(sql = stmt.sql(), tx = self.in_transaction(), "query_row");
        self.ctx.guard(self.querier.query_row(stmt)).await
    }

    pub async fn exec(&self, stmt: &Statement) -> Result<u64, DbError> {
        tracing::trace!(sql = stmt.sql(), tx = self.in_transaction(), "exec");
        self.ctx.guard(self.querier.exec(stmt)).await
    }
}
