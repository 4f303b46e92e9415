//! Per-call context: cancellation, deadline and the active transaction
//!
//! Every repository and transactor call takes a `&Context`. Outside a
//! transaction scope it only carries cancellation and a deadline; inside
//! `Transactor::run` it also carries the transaction, and repositories
//! execute against it instead of the pool.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::error::DbError;
use super::executor::TxHandle;

#[derive(Clone, Default)]
pub struct Context {
    cancel: CancellationToken,
    deadline: Option<Instant>,
    tx: Option<Arc<TxHandle>>,
}

impl Context {
    /// A context with no deadline that is never cancelled unless asked to.
    pub fn background() -> Self {
        Self::default()
    }

    /// Tighten the deadline to `timeout` from now. An earlier deadline is kept.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) if existing < deadline => existing,
            _ => deadline,
        });
        self
    }

    /// Derive a context that is cancelled when `parent` is cancelled.
    pub fn with_parent_token(mut self, parent: &CancellationToken) -> Self {
        self.cancel = parent.child_token();
        self
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn in_transaction(&self) -> bool {
        self.tx.is_some()
    }

    pub(crate) fn with_transaction(&self, tx: Arc<TxHandle>) -> Self {
        Self {
            cancel: self.cancel.clone(),
            deadline: self.deadline,
            tx: Some(tx),
        }
    }

    pub(crate) fn transaction(&self) -> Option<&TxHandle> {
        self.tx.as_deref()
    }

    /// Drive `fut` until it finishes, the context is cancelled, or the
    /// deadline passes. In the last two cases `fut` is dropped.
    pub async fn guard<T, E, F>(&self, fut: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: From<DbError>,
    {
        if self.cancel.is_cancelled() {
            return Err(DbError::Cancelled.into());
        }

        let deadline = async {
            match self.deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(DbError::Cancelled.into()),
            _ = deadline => Err(DbError::DeadlineExceeded.into()),
            out = fut => out,
        }
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("cancelled", &self.is_cancelled())
            .field("deadline", &self.deadline)
            .field("in_transaction", &self.in_transaction())
            .finish()
    }
}
