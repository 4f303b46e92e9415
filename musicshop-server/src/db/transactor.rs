//! Transaction scopes
//!
//! `Transactor::run` hands the closure a `Context` bound to one live
//! transaction. Success commits, failure or panic rolls back, and the
//! closure's error comes back unchanged.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use sqlx::PgPool;

use super::context::Context;
use super::error::DbError;
use super::executor::TxHandle;

#[async_trait]
pub trait Transactor: Send + Sync {
    /// Run `f` inside a transaction scope.
    ///
    /// If `ctx` is already inside a scope, `f` joins that transaction and
    /// the outer scope decides the outcome.
    async fn run<T, E, F, Fut>(&self, ctx: &Context, f: F) -> Result<T, E>
    where
        T: Send,
        E: From<DbError> + Send,
        F: FnOnce(Context) -> Fut + Send,
        Fut: Future<Output = Result<T, E>> + Send;
}

/// Postgres transactor over the shared pool
#[derive(Clone)]
pub struct PgTransactor {
    pool: PgPool,
}

impl PgTransactor {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Transactor for PgTransactor {
    async fn run<T, E, F, Fut>(&self, ctx: &Context, f: F) -> Result<T, E>
    where
        T: Send,
        E: From<DbError> + Send,
        F: FnOnce(Context) -> Fut + Send,
        Fut: Future<Output = Result<T, E>> + Send,
    {
        if ctx.in_transaction() {
            tracing::trace!("joining enclosing transaction");
            return f(ctx.clone()).await;
        }

        let tx = ctx
            .guard(async { self.pool.begin().await.map_err(DbError::from) })
            .await?;
        let handle = Arc::new(TxHandle::new(tx));
        let scoped = ctx.with_transaction(Arc::clone(&handle));
        tracing::trace!("transaction started");

        let outcome = AssertUnwindSafe(ctx.guard(f(scoped))).catch_unwind().await;

        match outcome {
            Ok(Ok(value)) => {
                handle.commit().await?;
                tracing::trace!("transaction committed");
                Ok(value)
            }
            Ok(Err(err)) => {
                rollback(&handle).await;
                Err(err)
            }
            Err(panic) => {
                rollback(&handle).await;
                std::panic::resume_unwind(panic)
            }
        }
    }
}

async fn rollback(handle: &TxHandle) {
    match handle.rollback().await {
        Ok(()) => tracing::debug!("transaction rolled back"),
        // The connection is discarded by the pool either way
        Err(e) => tracing::warn!(error = %e, "transaction rollback failed"),
    }
}
