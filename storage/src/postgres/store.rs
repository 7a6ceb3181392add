use crate::{
    database::store::{OnDemandStore, TransactionalStore},
    Error,
};
use async_trait::async_trait;
use futures::lock::Mutex;
use sqlx::{Pool, Postgres, Transaction};
use std::sync::Arc;

/// Ledger store backed directly by the pool.
#[derive(Debug)]
pub struct PgOnDemandStore {
    pub(crate) pool: Arc<Pool<Postgres>>,
}

impl PgOnDemandStore {
    pub(crate) fn new(pool: Arc<Pool<Postgres>>) -> Self {
        Self { pool }
    }
}

impl OnDemandStore for PgOnDemandStore {}

/// Ledger store bound to one Postgres transaction. Queries from the
/// per-table stores serialize on the mutex.
pub struct PgTransactionalStore {
    pub(crate) txn: Arc<Mutex<Transaction<'static, Postgres>>>,
}

impl PgTransactionalStore {
    pub(crate) fn new(txn: Arc<Mutex<Transaction<'static, Postgres>>>) -> Self {
        Self { txn }
    }

    // Fails if a query future still holds a clone of the transaction.
    fn into_transaction(self) -> Result<Transaction<'static, Postgres>, Error> {
        let lock = Arc::try_unwrap(self.txn).map_err(|_| {
            anyhow::anyhow!("transaction is still in use by an unfinished ledger query")
        })?;
        Ok(lock.into_inner())
    }
}

#[async_trait]
impl TransactionalStore for PgTransactionalStore {
    async fn commit(self) -> Result<(), Error> {
        self.into_transaction()?.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> Result<(), Error> {
        self.into_transaction()?.rollback().await?;
        Ok(())
    }
}
