use std::future::Future;
use std::time::Duration;

use crate::error::SchedulerResult;

/// Run `op` until it succeeds, fails with a non-retryable error, or
/// `max_attempts` tries are used up. Retry `n` waits `n * backoff`.
pub async fn retry_with_backoff<T, F, Fut>(
    label: &str,
    max_attempts: u32,
    backoff: Duration,
    mut op: F,
) -> SchedulerResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = SchedulerResult<T>>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && attempt < max_attempts => {
                let delay = backoff * attempt;
                tracing::warn!(
                    target: "helpix::scheduler",
                    job = label,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "job failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
