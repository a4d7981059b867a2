//! Bounded retry for read queries.
//!
//! A dropped connection or an exhausted pool gets one retry after a short
//! pause before the error surfaces. Writes are never routed through here: a
//! connection lost mid-write leaves the commit ambiguous, and retrying it
//! could apply the change twice.

use std::future::Future;
use std::time::Duration;

const RETRY_DELAY: Duration = Duration::from_millis(50);

fn is_transient(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut)
}

/// Runs `op`, retrying once when it fails with a transient connection error.
pub(crate) async fn with_retry<T, F, Fut>(mut op: F) -> Result<T, sqlx::Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, sqlx::Error>>,
{
    match op().await {
        Err(err) if is_transient(&err) => {
            tracing::warn!("Transient database error, retrying once: {}", err);
            tokio::time::sleep(RETRY_DELAY).await;
            op().await
        }
        other => other,
    }
}
