use std::collections::HashMap;
use std::time::Duration;

use bytes::Bytes;
use parking_lot::RwLock;
use tokio::sync::Notify;
use tokio::time::sleep_until;
use tokio::time::Instant;
use tracing::trace;

use super::GetOptions;
use super::KvEntry;
use super::KvStore;
use super::StoreResult;
use crate::constants::DEFAULT_LONG_POLL_WAIT_MS;

/// In-memory versioned store.
///
/// Every write bumps a store-wide modify index and stamps it on the written
/// key, so versions are strictly increasing across the whole store.
#[derive(Debug, Default)]
pub struct MemKvStore {
    data: RwLock<MemState>,
    changed: Notify,
}

#[derive(Debug, Default)]
struct MemState {
    entries: HashMap<String, KvEntry>,
    modify_index: u64,
}

impl MemKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes `value` and returns the version it was stored at
    pub fn put(
        &self,
        key: impl Into<String>,
        value: impl Into<Bytes>,
    ) -> u64 {
        let version = {
            let mut data = self.data.write();
            data.modify_index += 1;
            let version = data.modify_index;
            data.entries.insert(key.into(), KvEntry::new(value, version));
            version
        };
        self.changed.notify_waiters();
        version
    }

    /// Removes `key`; returns whether it existed
    pub fn delete(
        &self,
        key: &str,
    ) -> bool {
        let existed = {
            let mut data = self.data.write();
            data.modify_index += 1;
            data.entries.remove(key).is_some()
        };
        self.changed.notify_waiters();
        existed
    }

    /// Simulates a restore from an older snapshot: the modify index drops to
    /// `index` and no entry keeps a version above it.
    pub fn restore_index(
        &self,
        index: u64,
    ) {
        {
            let mut data = self.data.write();
            data.modify_index = index;
            for entry in data.entries.values_mut() {
                entry.version = entry.version.min(index);
            }
        }
        self.changed.notify_waiters();
    }

    pub fn modify_index(&self) -> u64 {
        self.data.read().modify_index
    }

    fn current(
        &self,
        key: &str,
    ) -> Option<KvEntry> {
        self.data.read().entries.get(key).cloned()
    }
}

#[async_trait::async_trait]
impl KvStore for MemKvStore {
    async fn get(
        &self,
        key: &str,
        options: GetOptions,
    ) -> StoreResult<Option<KvEntry>> {
        let Some(min_version) = options.min_version else {
            return Ok(self.current(key));
        };

        let wait = options.wait.unwrap_or(Duration::from_millis(DEFAULT_LONG_POLL_WAIT_MS));
        let deadline = Instant::now() + wait;

        loop {
            // Register interest before looking, so a write in between is not missed
            let notified = self.changed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            match self.current(key) {
                Some(entry) if entry.version == min_version => {}
                other => return Ok(other),
            }

            tokio::select! {
                _ = &mut notified => {
                    trace!(key, "store changed, re-checking");
                }
                _ = sleep_until(deadline) => {
                    trace!(key, min_version, "blocking get timed out");
                    return Ok(self.current(key));
                }
            }
        }
    }
}
