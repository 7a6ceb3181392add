use crate::Error;
use async_trait::async_trait;

/// Runs each statement on whatever pooled connection is free.
pub trait OnDemandStore: Send + Sync {}

/// Holds one connection with an open transaction until `commit` or
/// `rollback` consumes it. A dropped store rolls back.
#[async_trait]
pub trait TransactionalStore: Send + Sync {
    async fn commit(self) -> Result<(), Error>;

    async fn rollback(self) -> Result<(), Error>;
}
