use std::fmt;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;

use dynconf::BackoffPolicy;
use dynconf::DecodeError;
use dynconf::SupersededHook;
use dynconf::Value;
use dynconf::WatchConfig;
use dynconf::WatchStoppedHook;
use serde::Deserialize;
use tokio::time::Instant;

pub const SETTLE: Duration = Duration::from_secs(5);

pub fn watch_config() -> WatchConfig {
    WatchConfig {
        long_poll_wait_ms: 250,
        retry: BackoffPolicy {
            min_backoff_ms: 10,
            max_backoff_ms: 100,
            ..BackoffPolicy::watch_default()
        },
    }
}

/// Feature flags as an operator would publish them
#[derive(Debug, Default)]
pub struct ServiceConfig {
    pub foo: i64,
    pub bar: String,
    superseded: AtomicUsize,
    stopped: AtomicUsize,
}

#[derive(Deserialize)]
struct Payload {
    #[serde(rename = "Foo")]
    foo: i64,
    #[serde(rename = "Bar")]
    bar: String,
}

impl ServiceConfig {
    pub fn superseded_count(&self) -> usize {
        self.superseded.load(Ordering::SeqCst)
    }

    pub fn stopped_count(&self) -> usize {
        self.stopped.load(Ordering::SeqCst)
    }
}

impl fmt::Display for ServiceConfig {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "foo={} bar={}", self.foo, self.bar)
    }
}

impl Value for ServiceConfig {
    fn decode(
        &mut self,
        data: &[u8],
    ) -> Result<(), DecodeError> {
        let payload: Payload = serde_json::from_slice(data)?;
        self.foo = payload.foo;
        self.bar = payload.bar;
        Ok(())
    }

    fn as_superseded_hook(&self) -> Option<&dyn SupersededHook> {
        Some(self)
    }

    fn as_stopped_hook(&self) -> Option<&dyn WatchStoppedHook> {
        Some(self)
    }
}

impl SupersededHook for ServiceConfig {
    fn on_superseded(&self) {
        self.superseded.fetch_add(1, Ordering::SeqCst);
    }
}

impl WatchStoppedHook for ServiceConfig {
    fn on_watch_stopped(&self) {
        self.stopped.fetch_add(1, Ordering::SeqCst);
    }
}

pub async fn wait_until<F>(
    timeout: Duration,
    mut condition: F,
) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = Instant::now() + timeout;
    while !condition() {
        if Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    true
}
