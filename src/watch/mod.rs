//! Keeping a local value synchronized with one key of a versioned store.
//!
//! # Lifecycle
//!
//! ```text
//! add_watch ──► synchronous get ──► decode ──► spawn long-poll task ──► Watch
//!                  │                  │
//!                  └─ KeyNotFound /   └─ Decode error
//!                     Transport error
//!
//! long-poll task:
//!   Polling ──(new version, decoded)──► Updated ──► Polling
//!   Polling ──(new version, malformed)──► Stale ──► Polling
//!   Polling ──(timeout, same version)──► Polling
//!   Polling ──(retries exhausted)──► Stopped
//!   any ──(cancelled)──► Removed
//! ```
//!
//! # Concurrency
//!
//! - The long-poll task is the only writer of a watch's value and version.
//! - [`Watch::value`] is a lock-free load of an `ArcSwap`; it never blocks
//!   and never observes a partially decoded value.
//! - [`Watch::remove`] cancels the task and waits for it to exit. Once it
//!   returns no value is superseded and no store request is issued.
//!
//! # Example
//!
//! ```ignore
//! let store = Arc::new(MemKvStore::new());
//! store.put("service/limits", r#"{"max_connections": 64}"#);
//!
//! let watcher = Watcher::new(store, WatchConfig::default());
//! let watch = watcher
//!     .add_watch("service/limits", JsonValue::<Limits>::default)
//!     .await?;
//!
//! assert_eq!(watch.value().max_connections, 64);
//! watch.remove().await;
//! ```

mod handle;
mod manager;
mod poller;

pub use handle::*;
pub use manager::*;
