use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use arc_swap::ArcSwap;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::error;

use crate::Value;

/// State shared between a [`Watch`] and its long-poll task
#[derive(Debug)]
pub(crate) struct WatchState<V> {
    key: String,
    value: ArcSwap<V>,
    version: AtomicU64,
}

impl<V> WatchState<V> {
    pub(crate) fn new(
        key: String,
        value: V,
        version: u64,
    ) -> Self {
        Self {
            key,
            value: ArcSwap::from_pointee(value),
            version: AtomicU64::new(version),
        }
    }

    pub(crate) fn key(&self) -> &str {
        &self.key
    }

    pub(crate) fn value(&self) -> Arc<V> {
        self.value.load_full()
    }

    pub(crate) fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    /// Publishes `value` and returns the one it replaced
    pub(crate) fn publish(
        &self,
        value: V,
    ) -> Arc<V> {
        self.value.swap(Arc::new(value))
    }

    pub(crate) fn set_version(
        &self,
        version: u64,
    ) {
        self.version.store(version, Ordering::Release);
    }
}

/// A key kept in sync by a background long-poll task.
///
/// Created by [`crate::Watcher::add_watch`]. Dropping a `Watch` cancels its
/// task without waiting for it; call [`remove()`](Self::remove) to also wait
/// for the task to exit.
pub struct Watch<V> {
    state: Arc<WatchState<V>>,
    token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl<V> Watch<V>
where
    V: Value,
{
    pub(crate) fn new(
        state: Arc<WatchState<V>>,
        token: CancellationToken,
        handle: JoinHandle<()>,
    ) -> Self {
        Self {
            state,
            token,
            handle: Some(handle),
        }
    }

    /// The watched key
    pub fn key(&self) -> &str {
        self.state.key()
    }

    /// The latest successfully decoded value; never blocks
    pub fn value(&self) -> Arc<V> {
        self.state.value()
    }

    /// Store version of [`value()`](Self::value), `0` right after the store
    /// reported a lower version than the tracked one
    pub fn version(&self) -> u64 {
        self.state.version()
    }

    /// Whether the long-poll task is still running
    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Stops the watch and waits until its long-poll task has exited
    pub async fn remove(mut self) {
        self.token.cancel();

        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                error!(key = self.state.key(), "watch task failed: {}", e);
            }
        }
    }
}

impl<V> Drop for Watch<V> {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.token.cancel();
        }
    }
}

impl<V> std::fmt::Debug for Watch<V> {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("Watch")
            .field("key", &self.state.key)
            .field("version", &self.state.version())
            .finish_non_exhaustive()
    }
}
