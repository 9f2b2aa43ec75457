use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::CancelReason;

/// Per-call cancellation handle.
///
/// Every HTTP exchange and every backoff sleep of a logical call races against the
/// token and the optional deadline. Contexts are independent: cancelling one never
/// touches another unless they were built from the same token.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl CallContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Current abort condition, if any.
    pub fn check(&self) -> Result<(), CancelReason> {
        if self.cancel.is_cancelled() {
            return Err(CancelReason::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(CancelReason::DeadlineExceeded),
            _ => Ok(()),
        }
    }

    /// Drives `fut` unless the call is cancelled or its deadline passes first.
    pub async fn run<F: Future>(&self, fut: F) -> Result<F::Output, CancelReason> {
        self.check()?;
        let deadline = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(CancelReason::Cancelled),
            _ = deadline => Err(CancelReason::DeadlineExceeded),
            output = fut => Ok(output),
        }
    }

    pub async fn sleep(&self, duration: Duration) -> Result<(), CancelReason> {
        self.run(tokio::time::sleep(duration)).await
    }
}
