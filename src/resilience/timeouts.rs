//! Timeout enforcement.

use std::future::Future;
use std::time::Duration;

use tokio::time;

/// The deadline passed before the wrapped call finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("deadline of {0:?} exceeded")]
pub struct DeadlineExceeded(pub Duration);

/// Run `fut` with a hard deadline.
pub async fn with_deadline<F, T>(deadline: Duration, fut: F) -> Result<T, DeadlineExceeded>
where
    F: Future<Output = T>,
{
    time::timeout(deadline, fut)
        .await
        .map_err(|_| DeadlineExceeded(deadline))
}
