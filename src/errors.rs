//! Error hierarchy surfaced to callers of the watch API.
//!
//! Only the initial fetch done by [`crate::Watcher::add_watch`] reports
//! errors. Failures seen by the background long-poll task are retried or
//! skipped and never reach the caller.

use bytes::Bytes;
use config::ConfigError;

use crate::store::StoreError;
use crate::value::DecodeError;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The store holds no value for the key
    #[error("key not found: key={key:?}")]
    KeyNotFound { key: String },

    /// The payload could not be decoded by a fresh value instance
    #[error("value decode failed: key={key:?} data={data:?}")]
    Decode {
        key: String,
        data: Bytes,
        #[source]
        source: DecodeError,
    },

    /// The get request itself failed
    #[error("kv get failed: key={key:?}")]
    Transport {
        key: String,
        #[source]
        source: StoreError,
    },

    /// Configuration loading or validation failures
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl Error {
    /// Key the failed operation was issued for, if any
    pub fn key(&self) -> Option<&str> {
        match self {
            Error::KeyNotFound { key }
            | Error::Decode { key, .. }
            | Error::Transport { key, .. } => Some(key),
            Error::Config(_) => None,
        }
    }
}
