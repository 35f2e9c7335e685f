use crate::error::{ChainError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::trace;

/// Poll `probe` until it yields a value or `timeout` elapses.
///
/// The probe runs at least once. Errors from the probe end the wait
/// immediately; running out of time gives `ChainError::Timeout`.
pub async fn wait_until<T, F, Fut>(
    what: &str,
    timeout: Duration,
    interval: Duration,
    mut probe: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    let deadline = Instant::now() + timeout;
    let mut attempts = 0u32;
    loop {
        attempts += 1;
        if let Some(value) = probe().await? {
            trace!("{} ready after {} probes", what, attempts);
            return Ok(value);
        }

        let now = Instant::now();
        if now >= deadline {
            return Err(ChainError::Timeout {
                what: what.to_string(),
                after: timeout,
            });
        }
        tokio::time::sleep(interval.min(deadline - now)).await;
    }
}
