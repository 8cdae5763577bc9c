//! Exponential backoff retry driver.
//!
//! [`Retry`] knows nothing about the operation it drives: it keeps invoking it
//! until it yields a result, the attempt budget is used up, or the governing
//! [`CancellationToken`] is cancelled.

use std::future::Future;
use std::sync::OnceLock;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::BackoffPolicy;
use crate::NormalizedBackoff;

/// Result of [`Retry::run`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryOutcome<T> {
    /// The operation succeeded and produced a value
    Succeeded(T),

    /// The attempt budget was used up without success
    Exhausted { attempts: usize },

    /// The token was cancelled before the operation succeeded
    Cancelled,
}

impl<T> RetryOutcome<T> {
    pub fn succeeded(self) -> Option<T> {
        match self {
            RetryOutcome::Succeeded(value) => Some(value),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct Retry {
    policy: BackoffPolicy,
    normalized: OnceLock<NormalizedBackoff>,
}

impl Retry {
    pub fn new(policy: BackoffPolicy) -> Self {
        Self {
            policy,
            normalized: OnceLock::new(),
        }
    }

    /// Policy with defaults applied; computed on first use only
    pub fn policy(&self) -> &NormalizedBackoff {
        self.normalized.get_or_init(|| self.policy.normalized())
    }

    /// Drives `op` until it returns `Some`.
    ///
    /// The first invocation happens immediately. After the n-th failure the
    /// driver waits `min_backoff * factor^(n-1)` (capped at `max_backoff`)
    /// scaled by a random factor in `[1 - jitter, 1 + jitter]`. The wait is
    /// abandoned as soon as `token` is cancelled.
    pub async fn run<F, Fut, T>(
        &self,
        token: &CancellationToken,
        mut op: F,
    ) -> RetryOutcome<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Option<T>>,
    {
        let policy = *self.policy();
        let mut rng = StdRng::from_entropy();
        let mut attempts = 0;
        let mut backoff = Duration::ZERO;

        loop {
            if let Some(value) = op().await {
                return RetryOutcome::Succeeded(value);
            }

            if token.is_cancelled() {
                return RetryOutcome::Cancelled;
            }

            attempts += 1;
            if policy.is_exhausted(attempts) {
                return RetryOutcome::Exhausted { attempts };
            }

            backoff = policy.next_backoff(backoff);
            let wait = policy.jittered(backoff, rng.gen::<f64>());
            trace!(attempts, ?backoff, ?wait, "retrying after backoff");

            tokio::select! {
                biased;
                _ = token.cancelled() => return RetryOutcome::Cancelled,
                _ = sleep(wait) => {}
            }
        }
    }
}
