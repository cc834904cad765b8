//! Cancellation for in-flight GraphQL operations.

use std::sync::Arc;

use tokio::sync::watch;

/// A cloneable token used to cancel a pending operation.
///
/// The client checks the token before the HTTP exchange starts and races it
/// against the exchange. Once cancelled, a token stays cancelled.
///
/// # Example
///
/// ```ignore
/// let token = CancellationToken::new();
/// let pending = client.run_with_cancel::<Value>(request, &token);
///
/// // From another task
/// token.cancel();
/// ```
#[derive(Clone, Debug)]
pub struct CancellationToken {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancellationToken {
    /// Create a token that is not cancelled.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Cancel every operation observing this token.
    ///
    /// Returns `true` if this call flipped the token, `false` if it was
    /// already cancelled.
    pub fn cancel(&self) -> bool {
        !self.tx.send_replace(true)
    }

    /// Check whether the token has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Wait until the token is cancelled.
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_cancel_once() {
        let token = CancellationToken::new();
        assert!(!token.is_cancelled());
        assert!(token.cancel());
        assert!(token.is_cancelled());
        assert!(!token.cancel());
    }

    #[test]
    fn test_clones_share_state() {
        let token = CancellationToken::new();
        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancelled_resolves() {
        let token = CancellationToken::new();
        let waiter = token.clone();
        let task = tokio::spawn(async move { waiter.cancelled().await });

        tokio::time::sleep(Duration::from_millis(10)).await;
        token.cancel();

        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("cancelled() did not resolve")
            .unwrap();
    }

    #[tokio::test]
    async fn test_cancelled_already_set() {
        let token = CancellationToken::new();
        token.cancel();
        tokio::time::timeout(Duration::from_secs(1), token.cancelled())
            .await
            .expect("cancelled() did not resolve");
    }
}
