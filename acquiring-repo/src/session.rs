//! Shared SQLite session handle.
//!
//! One session is exclusively owned by one unit of work for its scope's
//! lifetime; repositories receive clones of the handle at construction and
//! are the only writers through it.

use std::sync::Arc;

use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};
use tokio::sync::{Mutex, MutexGuard};

use acquiring_types::RepoError;

pub(crate) struct SessionInner {
    pool: SqlitePool,
    tx: Option<Transaction<'static, Sqlite>>,
}

impl SessionInner {
    /// The live connection of the current transaction window.
    pub(crate) fn connection(&mut self) -> Result<&mut SqliteConnection, RepoError> {
        self.tx.as_deref_mut().ok_or(RepoError::SessionClosed)
    }

    async fn open_window(&mut self) -> Result<(), RepoError> {
        self.tx = Some(
            self.pool
                .begin()
                .await
                .map_err(|e| RepoError::Transaction(e.to_string()))?,
        );
        Ok(())
    }

    pub(crate) async fn commit(&mut self) -> Result<(), RepoError> {
        if let Some(tx) = self.tx.take() {
            tx.commit()
                .await
                .map_err(|e| RepoError::Transaction(e.to_string()))?;
        }
        tracing::debug!("session window committed");
        // A fresh window so later writes stay independent of this commit.
        self.open_window().await
    }

    pub(crate) async fn rollback(&mut self) -> Result<(), RepoError> {
        if let Some(tx) = self.tx.take() {
            tx.rollback()
                .await
                .map_err(|e| RepoError::Transaction(e.to_string()))?;
        }
        tracing::debug!("session window rolled back");
        self.open_window().await
    }
}

/// Cloneable handle to the session owned by one unit of work.
///
/// Dropping the last handle drops the open transaction, which sqlx rolls
/// back: the window since the last boundary never becomes durable unless
/// `commit` was called.
#[derive(Clone)]
pub struct SqliteSession(Arc<Mutex<SessionInner>>);

impl SqliteSession {
    /// Opens a transaction on the pool and wraps it in a shared handle.
    pub(crate) async fn begin(pool: SqlitePool) -> Result<Self, RepoError> {
        let tx = pool
            .begin()
            .await
            .map_err(|e| RepoError::Transaction(e.to_string()))?;
        tracing::debug!("session opened");
        Ok(Self(Arc::new(Mutex::new(SessionInner {
            pool,
            tx: Some(tx),
        }))))
    }

    pub(crate) async fn lock(&self) -> MutexGuard<'_, SessionInner> {
        self.0.lock().await
    }

    pub(crate) async fn commit(&self) -> Result<(), RepoError> {
        self.0.lock().await.commit().await
    }

    pub(crate) async fn rollback(&self) -> Result<(), RepoError> {
        self.0.lock().await.rollback().await
    }
}
