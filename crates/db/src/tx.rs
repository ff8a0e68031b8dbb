//! PostgreSQL implementation of the transaction handle.

use std::any::Any;

use async_trait::async_trait;
use flighthours_core::error::CoreError;
use flighthours_core::tx::{self, Transaction, TransactionManager};
use sqlx::{PgConnection, Postgres};

use crate::error::classify;
use crate::DbPool;

/// An open PostgreSQL transaction. Dropped unfinished, sqlx rolls it back.
pub struct PgTx {
    inner: sqlx::Transaction<'static, Postgres>,
}

#[async_trait]
impl Transaction for PgTx {
    async fn commit(self: Box<Self>) -> Result<(), CoreError> {
        self.inner
            .commit()
            .await
            .map_err(|e| CoreError::TransactionCommitFailed(e.to_string()))
    }

    async fn rollback(self: Box<Self>) -> Result<(), CoreError> {
        self.inner
            .rollback()
            .await
            .map_err(|e| classify(e, CoreError::OperationFailed))
    }

    fn as_any_mut(&mut self) -> &mut (dyn Any + Send) {
        self
    }
}

/// The connection behind a handle opened by [`PgTransactionManager`].
pub fn conn(tx: &mut dyn Transaction) -> Result<&mut PgConnection, CoreError> {
    let pg = tx::downcast::<PgTx>(tx)?;
    Ok(&mut *pg.inner)
}

#[derive(Clone)]
pub struct PgTransactionManager {
    pool: DbPool,
}

impl PgTransactionManager {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionManager for PgTransactionManager {
    async fn begin(&self) -> Result<Box<dyn Transaction>, CoreError> {
        let inner = self
            .pool
            .begin()
            .await
            .map_err(|e| classify(e, CoreError::TransactionBeginFailed))?;
        Ok(Box::new(PgTx { inner }))
    }

    async fn ping(&self) -> Result<(), CoreError> {
        crate::health_check(&self.pool)
            .await
            .map_err(|e| classify(e, CoreError::DatabaseUnavailable))
    }
}
