//! Adds a `.with_timeout()` combinator to any future.

use std::future::Future;
use std::time::Duration;

pub use tokio::time::error::Elapsed;

/// Extension trait adding timeout support to any future.
pub trait FutureExt: Future + Sized {
    /// Wraps this future with a timeout, returning [`Elapsed`] if it fires
    /// before the future resolves.
    fn with_timeout(self, duration: Duration) -> impl Future<Output = Result<Self::Output, Elapsed>> {
        tokio::time::timeout(duration, self)
    }
}

impl<F: Future> FutureExt for F {}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::FutureExt;

    #[tokio::test]
    async fn completes_before_timeout() {
        let result = tokio::time::sleep(Duration::from_millis(1))
            .with_timeout(Duration::from_secs(5))
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn elapses_when_too_slow() {
        let result = std::future::pending::<()>()
            .with_timeout(Duration::from_millis(1))
            .await;
        assert!(result.is_err());
    }
}
