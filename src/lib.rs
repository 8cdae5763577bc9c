//! # dynconf
//!
//! Keeps a strongly-typed value continuously synchronized with one key of a
//! versioned key-value store that supports blocking reads.
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use dynconf::{JsonValue, MemKvStore, WatchConfig, Watcher};
//!
//! #[derive(Default, serde::Serialize, serde::Deserialize)]
//! struct Limits {
//!     max_connections: u32,
//! }
//!
//! let store = Arc::new(MemKvStore::new());
//! store.put("service/limits", r#"{"max_connections": 64}"#);
//!
//! let watcher = Watcher::new(store.clone(), WatchConfig::new()?.validate()?);
//! let watch = watcher.add_watch("service/limits", JsonValue::<Limits>::default).await?;
//!
//! // Lock-free read of the latest decoded value
//! assert_eq!(watch.value().max_connections, 64);
//!
//! watch.remove().await;
//! ```
//!
//! - [`Watcher`] - creates watches against a [`KvStore`]
//! - [`Watch`] - one key kept in sync by a background long-poll task
//! - [`Value`] - decoding contract and optional notification hooks
//! - [`WatchConfig`] / [`BackoffPolicy`] - long-poll and retry tuning

mod config;
mod constants;
mod errors;
mod store;
mod value;
mod watch;

pub mod metrics;
pub mod utils;

pub use config::*;
pub use errors::*;
pub use store::*;
pub use value::*;
pub use watch::*;

//-----------------------------------------------------------
// Test utils
