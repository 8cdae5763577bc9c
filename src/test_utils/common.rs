use std::time::Duration;

use tokio::time::Instant;

use crate::BackoffPolicy;
use crate::WatchConfig;

/// Short waits and backoffs so tests observe several poll cycles quickly
pub(crate) fn fast_watch_config() -> WatchConfig {
    WatchConfig {
        long_poll_wait_ms: 200,
        retry: BackoffPolicy {
            max_attempts: 0,
            min_backoff_ms: 10,
            max_backoff_ms: 50,
            backoff_factor: 2.0,
            jitter: 0.5,
        },
    }
}

/// Polls `condition` every 10ms until it holds or `timeout` elapses
pub(crate) async fn wait_until<F>(
    timeout: Duration,
    mut condition: F,
) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = Instant::now() + timeout;
    loop {
        if condition() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
