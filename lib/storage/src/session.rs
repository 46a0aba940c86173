use anyhow::Result;
use netdraft_core::{StoreConfig, TopologyStore};
use std::sync::Arc;
use tracing::{info, warn};

use crate::cache::LocalCache;
use crate::remote::RemoteStore;
use crate::sync::{SyncConfig, SyncEngine};

#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    pub store: StoreConfig,
    pub sync: SyncConfig,
}

/// A store wired to its sync engine and cache slot.
///
/// Opening a session rehydrates from the cache, attaches the sync engine and
/// runs the initial pull. Check [`Session::is_synced`] before trusting that
/// local edits will reach the server.
pub struct Session {
    store: TopologyStore,
    sync: SyncEngine,
}

impl Session {
    pub async fn open(remote: Arc<dyn RemoteStore>, config: SessionConfig) -> Result<Self> {
        let cache = match &config.sync.cache_dir {
            Some(dir) => Some(LocalCache::new(dir, &config.sync.namespace)?),
            None => None,
        };

        let cached = match cache.as_ref().map(LocalCache::load).transpose() {
            Ok(state) => state.flatten(),
            Err(e) => {
                warn!("Ignoring unreadable cache slot: {:#}", e);
                None
            }
        };

        let sync = SyncEngine::new(remote, cache, &config.sync)?;
        let mut store = TopologyStore::new(config.store);
        if let Some(state) = cached {
            info!(projects = state.projects.len(), "restored cached projects");
            store.restore(state);
        }
        store.attach_sink(Arc::new(sync.clone()));

        sync.initialize(&mut store).await;
        Ok(Self { store, sync })
    }

    #[inline]
    pub fn store(&self) -> &TopologyStore {
        &self.store
    }

    #[inline]
    pub fn store_mut(&mut self) -> &mut TopologyStore {
        &mut self.store
    }

    #[inline]
    pub fn sync(&self) -> &SyncEngine {
        &self.sync
    }

    /// Whether the initial pull succeeded.
    #[inline]
    pub fn is_synced(&self) -> bool {
        self.sync.is_initialized()
    }

    /// Retry the initial pull after a failure.
    pub async fn retry_pull(&mut self) -> bool {
        self.sync.initialize(&mut self.store).await
    }

    /// Push anything still waiting on the debounce timer.
    pub async fn close(self) {
        self.sync.flush().await;
    }
}
