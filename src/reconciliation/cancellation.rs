//! Cancellation for poll loops.
//!
//! Every poll loop owns a token; the view that started the loop keeps the
//! handle and cancels it on teardown. The token is checked immediately on
//! re-entry after every suspension point, so a loop that was cancelled
//! mid-fetch discards the possibly-stale result instead of applying it.

use std::sync::Arc;

use tokio::sync::watch;

/// Cancellation state observed by a poll loop
#[derive(Debug, Clone)]
pub struct CancellationToken {
    receiver: watch::Receiver<bool>,
    // Keeps the channel open for tokens without a handle, e.g. `never()`.
    _keepalive: Option<Arc<watch::Sender<bool>>>,
}

impl CancellationToken {
    /// Create a token together with the handle that cancels it
    pub fn pair() -> (CancellationToken, CancellationHandle) {
        let (sender, receiver) = watch::channel(false);
        (
            CancellationToken {
                receiver,
                _keepalive: None,
            },
            CancellationHandle { sender },
        )
    }

    /// A token that is never cancelled, for callers without a teardown path
    pub fn never() -> Self {
        let (sender, receiver) = watch::channel(false);
        Self {
            receiver,
            _keepalive: Some(Arc::new(sender)),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Resolve once cancellation is requested.
    ///
    /// Pends forever for `never()` tokens and for tokens whose handle was
    /// dropped without cancelling.
    pub async fn cancelled(&self) {
        let mut receiver = self.receiver.clone();
        loop {
            if *receiver.borrow_and_update() {
                return;
            }
            if receiver.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

/// Handle held by the owner of a poll loop
#[derive(Debug)]
pub struct CancellationHandle {
    sender: watch::Sender<bool>,
}

impl CancellationHandle {
    pub fn cancel(&self) {
        let _ = self.sender.send(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.sender.borrow()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pair_observes_cancel() {
        let (token, handle) = CancellationToken::pair();
        assert!(!token.is_cancelled());
        handle.cancel();
        assert!(token.is_cancelled());
        assert!(handle.is_cancelled());
        // Already-cancelled tokens resolve immediately.
        token.cancelled().await;
    }

    #[tokio::test]
    async fn test_never_token_stays_live() {
        let token = CancellationToken::never();
        assert!(!token.is_cancelled());
        let waited = tokio::time::timeout(
            std::time::Duration::from_millis(20),
            token.cancelled(),
        )
        .await;
        assert!(waited.is_err());
    }

    #[tokio::test]
    async fn test_cancelled_wakes_waiters() {
        let (token, handle) = CancellationToken::pair();
        let waiter = tokio::spawn(async move { token.cancelled().await });
        handle.cancel();
        tokio::time::timeout(std::time::Duration::from_secs(1), waiter)
            .await
            .expect("waiter should wake")
            .expect("waiter should not panic");
    }
}
