//! Retry with exponential backoff for transient package-manager errors.

use crate::error::Result;
use crate::types::RetryConfig;
use std::thread;
use std::time::Duration;

/// Receives a notification before each retry.
pub trait RetryObserver {
    /// Called after `attempt` (1-indexed) failed and before sleeping `delay`.
    fn on_retry(&self, attempt: u32, max_attempts: u32, error: &crate::Error, delay: Duration);
}

/// Observer that writes retries to the `log` facade.
pub struct LogObserver;

impl RetryObserver for LogObserver {
    fn on_retry(&self, attempt: u32, max_attempts: u32, error: &crate::Error, delay: Duration) {
        log::warn!(
            "attempt {attempt}/{max_attempts} failed: {error}; retrying in {}s",
            delay.as_secs()
        );
    }
}

/// Run `operation`, retrying retryable errors according to `config`.
///
/// Non-retryable errors are returned immediately. After the last attempt the
/// final error is returned.
pub fn with_retry<T, F>(
    config: &RetryConfig,
    observer: Option<&dyn RetryObserver>,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> Result<T>,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        match operation() {
            Ok(value) => return Ok(value),
            Err(e) if !e.is_retryable() || attempt + 1 >= max_attempts => return Err(e),
            Err(e) => {
                let delay = config.delay_for_attempt(attempt);
                if let Some(obs) = observer {
                    obs.on_retry(attempt + 1, max_attempts, &e, delay);
                }
                thread::sleep(delay);
                attempt += 1;
            }
        }
    }
}
