//! Values kept up to date by a watch.
//!
//! A watch decodes every new payload into a fresh instance produced by its
//! [`ValueFactory`], so a published value is never mutated in place.
//!
//! Notifications are optional capabilities: a value opts in by returning
//! itself from [`Value::as_superseded_hook`] or [`Value::as_stopped_hook`].
//!
//! ```ignore
//! struct Limits {
//!     max_connections: u32,
//!     superseded: tokio::sync::Notify,
//! }
//!
//! impl SupersededHook for Limits {
//!     fn on_superseded(&self) {
//!         self.superseded.notify_waiters();
//!     }
//! }
//!
//! impl Value for Limits {
//!     fn decode(&mut self, data: &[u8]) -> Result<(), DecodeError> {
//!         self.max_connections = std::str::from_utf8(data)?.trim().parse()?;
//!         Ok(())
//!     }
//!
//!     fn as_superseded_hook(&self) -> Option<&dyn SupersededHook> {
//!         Some(self)
//!     }
//! }
//! ```

mod json;

pub use json::*;


use std::fmt;
use std::sync::Arc;

/// Error returned by [`Value::decode`]
pub type DecodeError = Box<dyn std::error::Error + Send + Sync>;

/// Produces an empty value to decode a payload into
pub type ValueFactory<V> = Arc<dyn Fn() -> V + Send + Sync>;

/// A strongly-typed value decoded from a key's payload.
///
/// `Display` is used when logging updates.
pub trait Value: fmt::Display + Send + Sync + 'static {
    /// Decodes `data` into `self`
    fn decode(
        &mut self,
        data: &[u8],
    ) -> Result<(), DecodeError>;

    fn as_superseded_hook(&self) -> Option<&dyn SupersededHook> {
        None
    }

    fn as_stopped_hook(&self) -> Option<&dyn WatchStoppedHook> {
        None
    }
}

/// Called once when a newer value replaced this one as the current value.
///
/// By the time it runs, readers already observe the newer value.
pub trait SupersededHook {
    fn on_superseded(&self);
}

/// Called once on the current value when its watch terminates
pub trait WatchStoppedHook {
    fn on_watch_stopped(&self);
}
