//! Deadline-bounded draining of a serving future.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::discovery::Protocol;
use crate::error::ShutdownError;

/// Drive `serve` to completion, bounding the drain that follows cancellation.
///
/// `serve` must itself begin a graceful stop when `cancel` fires. Once that
/// happens, `deadline` (if any) starts counting; when it elapses the serving
/// future is dropped, which closes the listener and abandons in-flight work.
/// Returns `None` when the drain was cut short.
pub async fn drain<F, T>(
    protocol: Protocol,
    serve: F,
    cancel: &CancellationToken,
    deadline: Option<Duration>,
) -> Option<T>
where
    F: Future<Output = T>,
{
    tokio::pin!(serve);

    tokio::select! {
        out = &mut serve => return Some(out),
        _ = cancel.cancelled() => {}
    }

    let Some(deadline) = deadline else {
        return Some(serve.await);
    };

    match tokio::time::timeout(deadline, &mut serve).await {
        Ok(out) => Some(out),
        Err(_) => {
            let err = ShutdownError::DeadlineExceeded {
                protocol,
                secs: deadline.as_secs(),
            };
            tracing::error!(error = %err, "Graceful drain timed out");
            None
        }
    }
}
