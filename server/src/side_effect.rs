use log::{debug, warn};
use std::{future::Future, time::Duration};
use tokio::task::JoinHandle;

/// Runs work that must never influence the outcome of the request that
/// triggered it. Failures are logged here and go no further.
#[derive(Clone, Debug)]
pub struct SideEffects {
    timeout: Duration,
}

impl SideEffects {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn dispatch<F>(&self, name: &'static str, task: F) -> JoinHandle<()>
    where
        F: Future<Output = Result<(), anyhow::Error>> + Send + 'static,
    {
        let timeout = self.timeout;
        tokio::spawn(async move {
            match tokio::time::timeout(timeout, task).await {
                Ok(Ok(())) => debug!("Side effect '{}' completed", name),
                Ok(Err(e)) => warn!("Side effect '{}' failed: {:?}", name, e),
                Err(_) => warn!("Side effect '{}' timed out after {:?}", name, timeout),
            }
        })
    }
}
