use std::sync::Arc;
use std::time::Duration;

use stylist_storage::{Storage, StorageResult};
use tokio::time::interval;

/// Deletes files served under `/uploads` once their retention window has passed.
#[derive(Clone)]
pub struct UploadSweeper {
    storage: Arc<dyn Storage>,
    retention: Duration,
    sweep_interval: Duration,
}

impl UploadSweeper {
    pub fn new(storage: Arc<dyn Storage>, retention: Duration, sweep_interval: Duration) -> Self {
        Self {
            storage,
            retention,
            sweep_interval,
        }
    }

    /// Start the background sweep loop.
    /// Returns a JoinHandle for graceful shutdown
    pub fn start(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut sweep_interval = interval(self.sweep_interval);

            loop {
                sweep_interval.tick().await;

                match self.sweep_once().await {
                    Ok(0) => tracing::debug!("Upload sweep found nothing to remove"),
                    Ok(removed) => tracing::info!(removed, "Removed expired uploads"),
                    Err(e) => tracing::error!(error = %e, "Upload sweep failed"),
                }
            }
        })
    }

    #[tracing::instrument(skip(self), fields(retention_secs = self.retention.as_secs()))]
    pub async fn sweep_once(&self) -> StorageResult<usize> {
        self.storage.purge_older_than(self.retention).await
    }
}
