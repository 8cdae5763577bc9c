use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::error;
use tracing::info;
use tracing::trace;
use tracing::warn;

use super::handle::WatchState;
use crate::constants::NO_BASELINE_VERSION;
use crate::metrics::ACTIVE_WATCHES;
use crate::metrics::DECODE_FAILURES;
use crate::metrics::STORE_ERRORS;
use crate::metrics::STORE_ERROR_NOT_FOUND;
use crate::metrics::STORE_ERROR_TRANSPORT;
use crate::metrics::VALUE_UPDATES;
use crate::metrics::VERSION_RESETS;
use crate::utils::retry::Retry;
use crate::utils::retry::RetryOutcome;
use crate::GetOptions;
use crate::KvEntry;
use crate::KvStore;
use crate::Value;
use crate::ValueFactory;

/// Background task keeping a [`WatchState`] in sync with the store.
///
/// It is the only writer of the state's value and version.
pub(crate) struct LongPoller<S, V> {
    pub(crate) store: Arc<S>,
    pub(crate) state: Arc<WatchState<V>>,
    pub(crate) factory: ValueFactory<V>,
    pub(crate) token: CancellationToken,
    pub(crate) retry: Retry,
    pub(crate) wait: Duration,
}

impl<S, V> LongPoller<S, V>
where
    S: KvStore,
    V: Value,
{
    /// Runs until the token is cancelled or the retry budget is exhausted
    pub(crate) async fn run(self) {
        ACTIVE_WATCHES.inc();

        // Version whose payload failed to decode; polls block on it instead of the published one
        let mut rejected: Option<u64> = None;

        loop {
            let baseline = self.state.version();
            let poll_from = rejected.unwrap_or(baseline);

            let entry = match self.retry.run(&self.token, || self.poll(poll_from)).await {
                RetryOutcome::Succeeded(entry) => entry,
                RetryOutcome::Exhausted { attempts } => {
                    warn!(attempts, "long poll retries exhausted, watch stopped");
                    break;
                }
                RetryOutcome::Cancelled => {
                    info!("watch removed");
                    break;
                }
            };

            if entry.version == poll_from {
                trace!(version = poll_from, "long poll returned without change");
                continue;
            }

            self.apply(entry, baseline, &mut rejected);
        }

        if let Some(hook) = self.state.value().as_stopped_hook() {
            hook.on_watch_stopped();
        }
        ACTIVE_WATCHES.dec();
    }

    /// One blocking get; `None` asks the retry driver to back off and try again
    async fn poll(
        &self,
        min_version: u64,
    ) -> Option<KvEntry> {
        let key = self.state.key();
        let options = GetOptions::blocking(min_version, self.wait);

        let result = tokio::select! {
            biased;
            _ = self.token.cancelled() => return None,
            result = self.store.get(key, options) => result,
        };

        match result {
            Ok(Some(entry)) => Some(entry),
            Ok(None) => {
                error!("key not found");
                STORE_ERRORS.with_label_values(&[key, STORE_ERROR_NOT_FOUND]).inc();
                None
            }
            Err(e) => {
                warn!(error = %e, "kv get failed");
                STORE_ERRORS.with_label_values(&[key, STORE_ERROR_TRANSPORT]).inc();
                None
            }
        }
    }

    /// Decodes `entry` and publishes it; a decode failure leaves the state untouched
    fn apply(
        &self,
        entry: KvEntry,
        baseline: u64,
        rejected: &mut Option<u64>,
    ) {
        let key = self.state.key();
        let mut value = (self.factory)();

        match value.decode(&entry.value) {
            Ok(()) => {
                info!(version = entry.version, new_value = %value, "value updated");
                let previous = self.state.publish(value);
                self.state.set_version(entry.version);
                VALUE_UPDATES.with_label_values(&[key]).inc();
                *rejected = None;

                if let Some(hook) = previous.as_superseded_hook() {
                    hook.on_superseded();
                }
            }
            Err(e) => {
                error!(
                    version = entry.version,
                    error = %e,
                    data = ?entry.value,
                    "value decode failed, keeping previous value"
                );
                DECODE_FAILURES.with_label_values(&[key]).inc();
                *rejected = Some(entry.version);
            }
        }

        if entry.version < baseline {
            warn!(
                version = entry.version,
                baseline, "store version went backwards, dropping baseline"
            );
            VERSION_RESETS.with_label_values(&[key]).inc();
            self.state.set_version(NO_BASELINE_VERSION);
        }
    }
}
