//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap one attempt (connect, send, body read) with a deadline
//! - Cancel the attempt cleanly when the deadline passes
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Timeout errors are distinct from transport errors
//! - Each attempt gets a fresh budget; nothing carries over between attempts

use std::future::Future;
use std::time::Duration;

use crate::resilience::retries::AttemptError;

/// Run `attempt`, failing with `AttemptError::Timeout` if it exceeds `limit`.
pub async fn with_timeout<F, T>(limit: Duration, attempt: F) -> Result<T, AttemptError>
where
    F: Future<Output = Result<T, AttemptError>>,
{
    match tokio::time::timeout(limit, attempt).await {
        Ok(result) => result,
        Err(_) => Err(AttemptError::Timeout(limit)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_times_out() {
        let result: Result<(), _> = with_timeout(Duration::from_millis(20), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;
        assert!(matches!(result, Err(AttemptError::Timeout(d)) if d == Duration::from_millis(20)));
    }

    #[tokio::test]
    async fn test_passes_through_result() {
        let result = with_timeout(Duration::from_secs(1), async { Ok::<_, AttemptError>(7) }).await;
        assert_eq!(result.unwrap(), 7);

        let result: Result<(), _> = with_timeout(Duration::from_secs(1), async {
            Err(AttemptError::InvalidRequest("bad".into()))
        })
        .await;
        assert!(matches!(result, Err(AttemptError::InvalidRequest(_))));
    }
}
