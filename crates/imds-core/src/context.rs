//! Request-scoped context for store operations.
//!
//! A [`RequestContext`] is created once per inbound request and passed down
//! to every store call. It carries the request id for log correlation, a
//! deadline, and the server's shutdown signal. Store calls awaited through
//! [`RequestContext::run`] are dropped (aborting the in-flight query) when
//! either fires.

use std::future::Future;
use std::time::Duration;

use imds_storage::StorageError;
use tokio::sync::watch;
use tokio::time::Instant;
use uuid::Uuid;

/// Deadline, cancellation signal, and identity of one request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: Uuid,
    deadline: Instant,
    cancel: watch::Receiver<bool>,
}

impl RequestContext {
    /// Create a context that expires `timeout` from now and is cancelled
    /// when `cancel` becomes `true`.
    #[must_use]
    pub fn new(timeout: Duration, cancel: watch::Receiver<bool>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            deadline: Instant::now() + timeout,
            cancel,
        }
    }

    /// Create a context with a deadline but no cancellation source.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        let (_tx, rx) = watch::channel(false);
        Self::new(timeout, rx)
    }

    /// The id used to correlate log lines for this request.
    #[must_use]
    pub const fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// Await a store call, bounded by the deadline and the cancel signal.
    ///
    /// # Errors
    ///
    /// Returns the call's own error, [`StorageError::Timeout`] if the
    /// deadline elapses first, or [`StorageError::Cancelled`] if shutdown is
    /// signalled first.
    pub async fn run<T, F>(&self, operation: &'static str, call: F) -> Result<T, StorageError>
    where
        F: Future<Output = Result<T, StorageError>>,
    {
        let mut cancel = self.cancel.clone();
        tokio::select! {
            result = tokio::time::timeout_at(self.deadline, call) => {
                result.map_err(|_| StorageError::Timeout { operation })?
            }
            () = cancelled(&mut cancel) => Err(StorageError::Cancelled { operation }),
        }
    }
}

/// Resolves once the signal reads `true`. A dropped sender never cancels.
async fn cancelled(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn run_passes_through_result() {
        let ctx = RequestContext::with_timeout(Duration::from_secs(5));
        let value = ctx.run("get", async { Ok::<_, StorageError>(7) }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn run_passes_through_error() {
        let ctx = RequestContext::with_timeout(Duration::from_secs(5));
        let err = ctx
            .run("get", async {
                Err::<(), _>(StorageError::NotFound { name: "x".to_owned() })
            })
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn run_times_out_at_deadline() {
        let ctx = RequestContext::with_timeout(Duration::from_millis(20));
        let err = ctx
            .run("get", async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok::<_, StorageError>(())
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Timeout { operation: "get" }));
    }

    #[tokio::test]
    async fn run_is_cancelled_by_shutdown() {
        let (tx, rx) = watch::channel(false);
        let ctx = RequestContext::new(Duration::from_secs(60), rx);
        let call = ctx.run("update", std::future::pending::<Result<(), StorageError>>());
        let trigger = async {
            tx.send(true).unwrap();
        };
        let (result, ()) = tokio::join!(call, trigger);
        assert!(matches!(result, Err(StorageError::Cancelled { operation: "update" })));
    }

    #[tokio::test]
    async fn already_cancelled_context_rejects_immediately() {
        let (tx, rx) = watch::channel(true);
        let ctx = RequestContext::new(Duration::from_secs(60), rx);
        let result = ctx.run("create", std::future::pending::<Result<(), StorageError>>()).await;
        assert!(matches!(result, Err(StorageError::Cancelled { .. })));
        drop(tx);
    }

    #[test]
    fn each_context_gets_a_fresh_id() {
        let a = RequestContext::with_timeout(Duration::from_secs(1));
        let b = RequestContext::with_timeout(Duration::from_secs(1));
        assert_ne!(a.request_id(), b.request_id());
    }
}
