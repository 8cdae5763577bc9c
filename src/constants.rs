use std::time::Duration;

// -
// Backoff defaults

/// Applied when a policy leaves `min_backoff_ms` unset
pub(crate) const DEFAULT_MIN_BACKOFF: Duration = Duration::from_millis(100);

/// Applied when a policy leaves `max_backoff_ms` unset
pub(crate) const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(300);

/// Applied when a policy's `backoff_factor` is below 1.0
pub(crate) const DEFAULT_BACKOFF_FACTOR: f64 = 2.0;

/// Jitter of the long-poll retry policy
pub(crate) const WATCH_BACKOFF_JITTER: f64 = 0.5;

// -
// Long poll

/// Blocking wait handed to the store on every long-poll request
pub(crate) const DEFAULT_LONG_POLL_WAIT_MS: u64 = 300_000;

/// Version used as "no baseline" after the store reported a lower index
pub(crate) const NO_BASELINE_VERSION: u64 = 0;

// -
// Configuration

/// Environment variable pointing at an optional configuration file
pub(crate) const CONFIG_PATH_ENV: &str = "CONFIG_PATH";

/// Prefix of environment variable overrides, e.g. `DYNCONF__RETRY__JITTER`
pub(crate) const ENV_PREFIX: &str = "DYNCONF";
