use std::future::Future;
use std::time::Duration;

use http::StatusCode;
use tracing::{debug, error, warn};

use crate::error::ClientError;
use crate::request::context::CallContext;

/// How a response status steers the retry loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Success,
    Retry,
    Terminal,
}

pub fn classify_status(status: StatusCode) -> StatusClass {
    let code = status.as_u16();
    match code {
        200..=299 => StatusClass::Success,
        429 => StatusClass::Retry,
        400..=499 => StatusClass::Terminal,
        500.. => StatusClass::Retry,
        _ => StatusClass::Terminal,
    }
}

/// Failure of a single attempt, tagged with whether another attempt may follow.
#[derive(Debug)]
pub struct AttemptError {
    pub error: ClientError,
    pub retryable: bool,
}

impl AttemptError {
    pub fn retry(error: ClientError) -> Self {
        Self { error, retryable: true }
    }

    pub fn terminal(error: ClientError) -> Self {
        Self { error, retryable: false }
    }
}

#[derive(Debug, Clone)]
pub struct RetrySettings {
    pub max_retries: u32,
    /// multiplied by the attempt number before every retry
    pub retry_delay: Duration,
}

impl RetrySettings {
    pub fn new(max_retries: u32, retry_delay: Duration) -> Self {
        Self { max_retries, retry_delay }
    }

    pub fn attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Linear backoff: nothing before the first attempt, `retry_delay * attempt` after.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.retry_delay.saturating_mul(attempt)
    }

    /// Runs `operation` up to `max_retries + 1` times.
    ///
    /// Terminal failures and cancellation end the loop immediately. Once every attempt
    /// failed, the last error is wrapped in [`ClientError::RetryExhausted`].
    pub async fn run_with_retry<F, Fut, T>(
        &self,
        ctx: &CallContext,
        url: &str,
        mut operation: F,
    ) -> Result<T, ClientError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, AttemptError>>,
    {
        let attempts = self.attempts();
        let mut last_error: Option<ClientError> = None;

        for attempt in 0..attempts {
            if attempt > 0 {
                let delay = self.delay_for(attempt);
                debug!(url, attempt, delay_ms = delay.as_millis() as u64, "backing off");
                ctx.sleep(delay)
                    .await
                    .map_err(|reason| ClientError::Cancelled { url: url.to_owned(), reason })?;
            }

            match operation(attempt).await {
                Ok(value) => return Ok(value),
                Err(AttemptError { error, retryable: true }) => {
                    warn!("Attempt {}/{} failed: {error}", attempt + 1, attempts);
                    last_error = Some(error);
                }
                Err(AttemptError { error, retryable: false }) => return Err(error),
            }
        }

        error!("all {attempts} attempts failed for {url}");
        let source = last_error.unwrap_or_else(|| {
            ClientError::invalid_request(url, "retry loop finished without an attempt")
        });
        Err(ClientError::RetryExhausted {
            url: url.to_owned(),
            attempts,
            source: Box::new(source),
        })
    }
}
