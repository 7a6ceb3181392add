use crate::{
    database::store::{OnDemandStore, TransactionalStore},
    Error,
};
use async_trait::async_trait;

/// Entry point to the donation ledger. Services depend on this trait so
/// tests can substitute `MockDatabaseClient`.
#[async_trait]
pub trait DatabaseClient<S, T>
where
    Self: Send + Sync,
    S: OnDemandStore,
    T: TransactionalStore,
{
    /// Store for single statements such as ledger reads and order inserts.
    fn on_demand(&self) -> S;

    /// Opens a transaction. Settlement and event creation write through this;
    /// dropping the store without `commit()` discards the writes.
    async fn begin(&self) -> Result<T, Error>;
}
