//! Bounded retry with fixed delay.
//!
//! Every network operation in the run goes through [`RetryPolicy::execute`].
//! Exhaustion surfaces as [`AppError::Exhausted`]; whether that is fatal or
//! converted into a FAILURE-sentinel record is the caller's policy.

use std::time::Duration;

use crate::error::{AppError, Result};
use crate::models::RetryConfig;

/// Retry budget: attempt ceiling and fixed delay between attempts.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self::new(config.max_attempts, Duration::from_secs(config.delay_secs))
    }
}

impl RetryPolicy {
    /// Run `op` up to `max_attempts` times, sleeping `delay` between
    /// failures. The final failure is wrapped in [`AppError::Exhausted`]
    /// and returned; earlier failures are logged and retried.
    pub async fn execute<T, F>(&self, operation: &str, mut op: F) -> Result<T>
    where
        F: AsyncFnMut() -> Result<T>,
    {
        let max = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(error) => {
                    if attempt >= max {
                        log::error!("'{operation}' failed on final attempt {attempt}/{max}: {error}");
                        return Err(AppError::Exhausted {
                            operation: operation.to_string(),
                            attempts: max,
                            source: Box::new(error),
                        });
                    }
                    log::warn!(
                        "'{operation}' attempt {attempt}/{max} failed: {error}. Retrying in {:?}.",
                        self.delay
                    );
                    tokio::time::sleep(self.delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
