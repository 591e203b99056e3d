//! Single-writer guard for in-process triggers.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;

/// Allows one run at a time per process.
///
/// A trigger that fires while a run is active is skipped, not queued: the
/// next trigger picks up whatever the skipped one would have seen.
/// This closes the check-then-write window between overlapping runs in
/// one process only. Separate processes sharing a store can still race.
#[derive(Clone, Default)]
pub struct RunGuard {
    active: Arc<Mutex<()>>,
}

impl RunGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `fut` unless another guarded run is active.
    ///
    /// Returns `None` when the trigger was skipped.
    pub async fn try_run<F, T>(&self, fut: F) -> Option<T>
    where
        F: Future<Output = T>,
    {
        let Ok(_permit) = self.active.try_lock() else {
            info!("Ingestion run already in progress, skipping trigger");
            return None;
        };
        Some(fut.await)
    }

    pub fn is_running(&self) -> bool {
        self.active.try_lock().is_err()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn test_overlapping_trigger_is_skipped() {
        let guard = RunGuard::new();
        let (release_tx, release_rx) = oneshot::channel::<()>();
        let (started_tx, started_rx) = oneshot::channel::<()>();

        let first = {
            let guard = guard.clone();
            tokio::spawn(async move {
                guard
                    .try_run(async move {
                        started_tx.send(()).unwrap();
                        release_rx.await.unwrap();
                        "first"
                    })
                    .await
            })
        };

        started_rx.await.unwrap();
        assert!(guard.is_running());
        assert_eq!(guard.try_run(async { "second" }).await, None);

        release_tx.send(()).unwrap();
        assert_eq!(first.await.unwrap(), Some("first"));

        assert!(!guard.is_running());
        assert_eq!(guard.try_run(async { "third" }).await, Some("third"));
    }
}
