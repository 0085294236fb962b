//! Timeout enforcement.
//!
//! # Responsibilities
//! - Put one deadline around the whole upstream exchange
//!   (connect, send, redirects, body read)
//! - Cancel the in-flight call cleanly when it fires
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities; dropping the future aborts the call
//! - Timeout errors are distinct from other errors so the message says so

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

/// The deadline passed before the wrapped future finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("upstream did not respond within {}s", .0.as_secs())]
pub struct DeadlineElapsed(pub Duration);

/// Run `fut` to completion or fail once `deadline` has passed.
pub async fn with_deadline<F, T>(deadline: Duration, fut: F) -> Result<T, DeadlineElapsed>
where
    F: Future<Output = T>,
{
    tokio::time::timeout(deadline, fut)
        .await
        .map_err(|_| DeadlineElapsed(deadline))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_completes_within_deadline() {
        let result = with_deadline(Duration::from_secs(1), async { 7 }).await;
        assert_eq!(result, Ok(7));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_elapses() {
        let result = with_deadline(Duration::from_secs(30), async {
            tokio::time::sleep(Duration::from_secs(60)).await;
        })
        .await;

        let err = result.unwrap_err();
        assert_eq!(err, DeadlineElapsed(Duration::from_secs(30)));
        assert_eq!(err.to_string(), "upstream did not respond within 30s");
    }
}
