//! Helpers around the shared `watch::Receiver<bool>` shutdown signal.

use std::time::Duration;
use tokio::sync::watch;

/// Resolve once the shutdown signal reads `true`.
///
/// If the sending side is dropped without ever signalling, this never
/// resolves.
pub async fn cancelled(shutdown_rx: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown_rx.borrow_and_update() {
            return;
        }
        if shutdown_rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Sleep for `duration` unless shutdown is signalled first.
///
/// Returns `true` if the sleep completed, `false` if it was cancelled.
pub async fn sleep_or_cancel(duration: Duration, shutdown_rx: &mut watch::Receiver<bool>) -> bool {
    tokio::select! {
        biased;
        _ = cancelled(shutdown_rx) => false,
        _ = tokio::time::sleep(duration) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sleep_is_cut_short_by_shutdown() {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let handle =
            tokio::spawn(
                async move { sleep_or_cancel(Duration::from_secs(3600), &mut shutdown_rx).await },
            );
        shutdown_tx.send(true).unwrap();
        let completed = tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
        assert!(!completed);
    }

    #[tokio::test]
    async fn test_sleep_completes_without_shutdown() {
        let (_shutdown_tx, mut shutdown_rx) = watch::channel(false);
        assert!(sleep_or_cancel(Duration::from_millis(5), &mut shutdown_rx).await);
    }

    #[tokio::test]
    async fn test_already_signalled_returns_immediately() {
        let (_shutdown_tx, mut shutdown_rx) = watch::channel(true);
        assert!(!sleep_or_cancel(Duration::from_secs(3600), &mut shutdown_rx).await);
    }
}
