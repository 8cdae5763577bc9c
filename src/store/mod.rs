//! Versioned key-value store boundary.
//!
//! A watch only needs one operation from the store: a get that can optionally
//! block until the key's version moves past a baseline. Any client, such as
//! a Consul or etcd gateway, can back a watch by implementing [`KvStore`].
//!
//! [`MemKvStore`] is an in-process implementation with the same blocking
//! semantics, used by tests and by embedders with a local source.

mod error;
mod mem_store;

pub use error::*;
pub use mem_store::*;


use std::time::Duration;

use bytes::Bytes;
#[cfg(test)]
use mockall::automock;

/// A key's payload together with the change-index it was written at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KvEntry {
    pub value: Bytes,
    pub version: u64,
}

impl KvEntry {
    pub fn new(
        value: impl Into<Bytes>,
        version: u64,
    ) -> Self {
        Self {
            value: value.into(),
            version,
        }
    }
}

/// Options of a single [`KvStore::get`] call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GetOptions {
    /// Block until the key's version differs from this one.
    /// `None` makes the call return immediately.
    pub min_version: Option<u64>,

    /// Upper bound of the blocking wait. Once it elapses the current entry is
    /// returned with its version unchanged.
    pub wait: Option<Duration>,
}

impl GetOptions {
    /// Options of a long-poll request
    pub fn blocking(
        min_version: u64,
        wait: Duration,
    ) -> Self {
        Self {
            min_version: Some(min_version),
            wait: Some(wait),
        }
    }

    pub fn is_blocking(&self) -> bool {
        self.min_version.is_some()
    }
}

/// Versioned key-value store with blocking reads.
///
/// # Contract
///
/// - `Ok(None)` means the key does not exist.
/// - With `min_version` unset the call returns the current entry at once.
/// - With `min_version` set the call returns as soon as the key's version
///   differs from it, or after `wait` with the version unchanged.
///
/// Implementations must be `Send + Sync`: one store is shared by every watch
/// created from the same [`crate::Watcher`].
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait KvStore: Send + Sync + 'static {
    async fn get(
        &self,
        key: &str,
        options: GetOptions,
    ) -> StoreResult<Option<KvEntry>>;
}
