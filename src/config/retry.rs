use std::time::Duration;

use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::constants::DEFAULT_BACKOFF_FACTOR;
use crate::constants::DEFAULT_MAX_BACKOFF;
use crate::constants::DEFAULT_MIN_BACKOFF;
use crate::constants::WATCH_BACKOFF_JITTER;
use crate::Error;
use crate::Result;

/// Exponential backoff policy with symmetric jitter
///
/// Unset (zero) fields fall back to defaults when the policy is normalized,
/// see [`BackoffPolicy::normalized`].
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
pub struct BackoffPolicy {
    /// Maximum number of attempts (0 means unlimited attempts)
    #[serde(default)]
    pub max_attempts: usize,

    /// Backoff before the first retry (unit: milliseconds, 0 means 100)
    #[serde(default)]
    pub min_backoff_ms: u64,

    /// Upper bound of the backoff (unit: milliseconds, 0 means 300000)
    #[serde(default)]
    pub max_backoff_ms: u64,

    /// Growth factor between consecutive retries (below 1.0 means 2.0)
    #[serde(default)]
    pub backoff_factor: f64,

    /// Fraction in [0, 1] by which each wait is randomized in both directions
    #[serde(default)]
    pub jitter: f64,
}

/// Snapshot of a [`BackoffPolicy`] with every default applied
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedBackoff {
    pub max_attempts: usize,
    pub min_backoff: Duration,
    pub max_backoff: Duration,
    pub backoff_factor: f64,
    pub jitter: f64,
}

impl BackoffPolicy {
    /// Policy driving the long-poll requests of a watch
    pub fn watch_default() -> Self {
        Self {
            jitter: WATCH_BACKOFF_JITTER,
            ..Default::default()
        }
    }

    /// Applies defaults and clamps out-of-range fields
    pub fn normalized(&self) -> NormalizedBackoff {
        let min_backoff = if self.min_backoff_ms == 0 {
            DEFAULT_MIN_BACKOFF
        } else {
            Duration::from_millis(self.min_backoff_ms)
        };

        let mut max_backoff = if self.max_backoff_ms == 0 {
            DEFAULT_MAX_BACKOFF
        } else {
            Duration::from_millis(self.max_backoff_ms)
        };
        if max_backoff < min_backoff {
            max_backoff = min_backoff;
        }

        // NaN fails the comparison too
        let backoff_factor = if self.backoff_factor >= 1.0 {
            self.backoff_factor
        } else {
            DEFAULT_BACKOFF_FACTOR
        };

        let jitter = if self.jitter.is_nan() {
            0.0
        } else {
            self.jitter.clamp(0.0, 1.0)
        };

        NormalizedBackoff {
            max_attempts: self.max_attempts,
            min_backoff,
            max_backoff,
            backoff_factor,
            jitter,
        }
    }

    /// Rejects settings that normalization would silently rewrite
    pub fn validate(&self) -> Result<()> {
        if !self.jitter.is_finite() || !(0.0..=1.0).contains(&self.jitter) {
            return Err(Error::Config(ConfigError::Message(format!(
                "retry jitter must be within [0, 1], got {}",
                self.jitter
            ))));
        }

        if !self.backoff_factor.is_finite()
            || (self.backoff_factor != 0.0 && self.backoff_factor < 1.0)
        {
            return Err(Error::Config(ConfigError::Message(format!(
                "retry backoff_factor must be 0 (default) or >= 1.0, got {}",
                self.backoff_factor
            ))));
        }

        if self.min_backoff_ms > 0
            && self.max_backoff_ms > 0
            && self.min_backoff_ms > self.max_backoff_ms
        {
            return Err(Error::Config(ConfigError::Message(format!(
                "retry min_backoff_ms ({}) exceeds max_backoff_ms ({})",
                self.min_backoff_ms, self.max_backoff_ms
            ))));
        }

        Ok(())
    }
}

impl NormalizedBackoff {
    /// Backoff following `previous`; `Duration::ZERO` means no retry happened yet
    pub fn next_backoff(
        &self,
        previous: Duration,
    ) -> Duration {
        if previous.is_zero() {
            return self.min_backoff;
        }

        scale(previous, self.backoff_factor)
            .map_or(self.max_backoff, |next| next.min(self.max_backoff))
    }

    /// Scales `backoff` by `1 - jitter + 2 * jitter * sample` for `sample` in [0, 1)
    pub fn jittered(
        &self,
        backoff: Duration,
        sample: f64,
    ) -> Duration {
        let factor = (1.0 - self.jitter) + 2.0 * self.jitter * sample;
        scale(backoff, factor).unwrap_or(backoff)
    }

    /// Whether `attempts` failed attempts used up the budget
    pub fn is_exhausted(
        &self,
        attempts: usize,
    ) -> bool {
        self.max_attempts != 0 && attempts >= self.max_attempts
    }
}

/// `duration * factor` at nanosecond precision, `None` when it does not fit
fn scale(
    duration: Duration,
    factor: f64,
) -> Option<Duration> {
    let nanos = duration.as_nanos() as f64 * factor;
    if nanos.is_finite() && nanos >= 0.0 && nanos < u64::MAX as f64 {
        Some(Duration::from_nanos(nanos as u64))
    } else {
        None
    }
}
