use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::info;
use tracing::info_span;
use tracing::Instrument;

use super::handle::Watch;
use super::handle::WatchState;
use super::poller::LongPoller;
use crate::utils::retry::Retry;
use crate::Error;
use crate::GetOptions;
use crate::KvEntry;
use crate::KvStore;
use crate::Result;
use crate::Value;
use crate::ValueFactory;
use crate::WatchConfig;

/// Entry point creating [`Watch`]es against one store.
///
/// Immutable after construction: the store client and configuration are
/// shared read-only by every watch it creates.
#[derive(Debug)]
pub struct Watcher<S> {
    store: Arc<S>,
    config: Arc<WatchConfig>,
    shutdown: CancellationToken,
}

impl<S> Watcher<S>
where
    S: KvStore,
{
    pub fn new(
        store: Arc<S>,
        config: WatchConfig,
    ) -> Self {
        Self {
            store,
            config: Arc::new(config),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn config(&self) -> &WatchConfig {
        &self.config
    }

    /// Watches `key`, decoding every payload into a value made by `factory`.
    ///
    /// Performs one non-blocking get and decodes it before anything is
    /// spawned, so a returned [`Watch`] always holds a value. The fetch is not
    /// retried.
    ///
    /// # Errors
    /// - [`Error::Transport`] if the get fails
    /// - [`Error::KeyNotFound`] if the store holds no value for `key`
    /// - [`Error::Decode`] if the payload does not decode
    pub async fn add_watch<V, F>(
        &self,
        key: impl Into<String>,
        factory: F,
    ) -> Result<Watch<V>>
    where
        V: Value,
        F: Fn() -> V + Send + Sync + 'static,
    {
        let key = key.into();
        let factory: ValueFactory<V> = Arc::new(factory);

        let entry = self.fetch(&key).await?;
        let mut value = factory();
        if let Err(source) = value.decode(&entry.value) {
            return Err(Error::Decode {
                key,
                data: entry.value,
                source,
            });
        }

        info!(key = %key, version = entry.version, value = %value, "watch added");

        let state = Arc::new(WatchState::new(key, value, entry.version));
        let token = self.shutdown.child_token();
        let span = info_span!("watch", key = %state.key());

        let poller = LongPoller {
            store: self.store.clone(),
            state: state.clone(),
            factory,
            token: token.clone(),
            retry: Retry::new(self.config.retry),
            wait: self.config.long_poll_wait(),
        };
        let handle = tokio::spawn(poller.run().instrument(span));

        Ok(Watch::new(state, token, handle))
    }

    /// Cancels every watch created by this watcher.
    ///
    /// Does not wait for their tasks; use [`Watch::remove`] for that.
    pub fn shutdown(&self) {
        debug!("cancelling all watches");
        self.shutdown.cancel();
    }

    async fn fetch(
        &self,
        key: &str,
    ) -> Result<KvEntry> {
        match self.store.get(key, GetOptions::default()).await {
            Ok(Some(entry)) => Ok(entry),
            Ok(None) => Err(Error::KeyNotFound { key: key.to_string() }),
            Err(source) => Err(Error::Transport {
                key: key.to_string(),
                source,
            }),
        }
    }
}
