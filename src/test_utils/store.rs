use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use crate::GetOptions;
use crate::KvEntry;
use crate::KvStore;
use crate::MemKvStore;
use crate::StoreError;
use crate::StoreResult;

/// [`MemKvStore`] that counts requests and can fail blocking gets on demand
#[derive(Debug, Default)]
pub(crate) struct FlakyStore {
    inner: MemKvStore,
    gets: AtomicUsize,
    failures_left: AtomicUsize,
}

impl FlakyStore {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn mem(&self) -> &MemKvStore {
        &self.inner
    }

    pub(crate) fn put(
        &self,
        key: &str,
        value: &'static str,
    ) -> u64 {
        self.inner.put(key, value)
    }

    /// Number of get requests received so far
    pub(crate) fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    /// Fails the next `count` blocking gets with a network error
    pub(crate) fn fail_next(
        &self,
        count: usize,
    ) {
        self.failures_left.store(count, Ordering::SeqCst);
    }

    pub(crate) fn failures_left(&self) -> usize {
        self.failures_left.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl KvStore for FlakyStore {
    async fn get(
        &self,
        key: &str,
        options: GetOptions,
    ) -> StoreResult<Option<KvEntry>> {
        self.gets.fetch_add(1, Ordering::SeqCst);

        if options.is_blocking()
            && self
                .failures_left
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
                .is_ok()
        {
            return Err(StoreError::NetworkError("connection reset".to_string()));
        }

        self.inner.get(key, options).await
    }
}
