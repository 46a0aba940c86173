// Debounced push / initial pull between the store and the remote
use anyhow::{anyhow, Result};
use netdraft_core::{ChangeSink, PersistedState, Project, TopologyStore};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::{LocalCache, DEFAULT_NAMESPACE};
use crate::remote::RemoteStore;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_secs(1);

/// Configuration for the sync engine
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Quiet period before a scheduled push fires.
    pub debounce: Duration,
    /// Cache slot name.
    pub namespace: String,
    /// Where the cache slot lives. `None` disables the cache.
    pub cache_dir: Option<PathBuf>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            namespace: DEFAULT_NAMESPACE.to_string(),
            cache_dir: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    pub pushes_attempted: u64,
    pub pushes_succeeded: u64,
    pub pushes_failed: u64,
    /// Pushes dropped because a newer revision had already landed.
    pub pushes_stale: u64,
    /// Push requests dropped because the initial pull had not completed.
    pub pushes_gated: u64,
}

struct PendingPush {
    revision: u64,
    projects: Vec<Project>,
}

struct SyncInner {
    remote: Arc<dyn RemoteStore>,
    cache: Option<LocalCache>,
    debounce: Duration,
    runtime: Handle,
    initialized: AtomicBool,
    pending: Mutex<Option<PendingPush>>,
    timer: Mutex<Option<JoinHandle<()>>>,
    /// Held for the duration of a push; stores the last revision that landed.
    in_flight: tokio::sync::Mutex<u64>,
    attempted: AtomicU64,
    succeeded: AtomicU64,
    failed: AtomicU64,
    stale: AtomicU64,
    gated: AtomicU64,
}

impl SyncInner {
    async fn push_pending(&self) {
        let mut last_pushed = self.in_flight.lock().await;

        let Some(pending) = self.pending.lock().take() else {
            return;
        };
        if pending.revision <= *last_pushed {
            self.stale.fetch_add(1, Ordering::Relaxed);
            debug!(revision = pending.revision, last = *last_pushed, "skipping stale push");
            return;
        }

        self.attempted.fetch_add(1, Ordering::Relaxed);
        match self.remote.push_projects(&pending.projects).await {
            Ok(()) => {
                *last_pushed = pending.revision;
                self.succeeded.fetch_add(1, Ordering::Relaxed);
                info!(
                    revision = pending.revision,
                    projects = pending.projects.len(),
                    "pushed projects"
                );
            }
            Err(e) => {
                self.failed.fetch_add(1, Ordering::Relaxed);
                warn!(revision = pending.revision, "Failed to sync projects to server: {:#}", e);
            }
        }
    }
}

/// Keeps the remote store and the cache slot in step with a [`TopologyStore`].
///
/// Attach a clone to the store as its [`ChangeSink`]. Pushes are debounced
/// (trailing edge), carry the whole collection, are never retried and are
/// refused until [`SyncEngine::initialize`] has pulled successfully.
#[derive(Clone)]
pub struct SyncEngine {
    inner: Arc<SyncInner>,
}

impl SyncEngine {
    /// Must be called from within a tokio runtime.
    pub fn new(
        remote: Arc<dyn RemoteStore>,
        cache: Option<LocalCache>,
        config: &SyncConfig,
    ) -> Result<Self> {
        let runtime = Handle::try_current()
            .map_err(|e| anyhow!("SyncEngine needs a tokio runtime: {}", e))?;

        Ok(Self {
            inner: Arc::new(SyncInner {
                remote,
                cache,
                debounce: config.debounce,
                runtime,
                initialized: AtomicBool::new(false),
                pending: Mutex::new(None),
                timer: Mutex::new(None),
                in_flight: tokio::sync::Mutex::new(0),
                attempted: AtomicU64::new(0),
                succeeded: AtomicU64::new(0),
                failed: AtomicU64::new(0),
                stale: AtomicU64::new(0),
                gated: AtomicU64::new(0),
            }),
        })
    }

    /// Pull the remote collection into `store` and open the push gate.
    ///
    /// Returns `false` if the fetch failed; the gate then stays closed and
    /// the call may be retried.
    pub async fn initialize(&self, store: &mut TopologyStore) -> bool {
        match self.inner.remote.fetch_projects().await {
            Ok(projects) => {
                info!(projects = projects.len(), "loaded projects from server");
                store.adopt_remote(projects);
                self.inner.initialized.store(true, Ordering::Release);
                true
            }
            Err(e) => {
                warn!("Failed to load projects from server: {:#}", e);
                false
            }
        }
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.inner.initialized.load(Ordering::Acquire)
    }

    pub fn has_pending_push(&self) -> bool {
        self.inner.pending.lock().is_some()
    }

    /// Cancel the debounce timer and push whatever is pending now.
    pub async fn flush(&self) {
        let timer = self.inner.timer.lock().take();
        if let Some(timer) = timer {
            timer.abort();
        }
        self.inner.push_pending().await;
    }

    pub fn stats(&self) -> SyncStats {
        SyncStats {
            pushes_attempted: self.inner.attempted.load(Ordering::Relaxed),
            pushes_succeeded: self.inner.succeeded.load(Ordering::Relaxed),
            pushes_failed: self.inner.failed.load(Ordering::Relaxed),
            pushes_stale: self.inner.stale.load(Ordering::Relaxed),
            pushes_gated: self.inner.gated.load(Ordering::Relaxed),
        }
    }

    fn schedule(&self) {
        let inner = self.inner.clone();
        let timer = self.inner.runtime.spawn(async move {
            tokio::time::sleep(inner.debounce).await;
            // Detached: rescheduling may abort this timer but never a request
            // that is already on the wire.
            let runtime = inner.runtime.clone();
            runtime.spawn(async move { inner.push_pending().await });
        });

        if let Some(previous) = self.inner.timer.lock().replace(timer) {
            previous.abort();
        }
    }
}

impl ChangeSink for SyncEngine {
    fn state_changed(&self, state: &PersistedState) {
        if let Some(cache) = &self.inner.cache {
            if let Err(e) = cache.save(state) {
                warn!("Failed to persist cache slot: {:#}", e);
            }
        }
    }

    fn push_requested(&self, state: &PersistedState, revision: u64) {
        if !self.is_initialized() {
            self.inner.gated.fetch_add(1, Ordering::Relaxed);
            debug!(revision, "initial pull not complete; push dropped");
            return;
        }

        *self.inner.pending.lock() = Some(PendingPush {
            revision,
            projects: state.projects.clone(),
        });
        debug!(revision, debounce_ms = self.inner.debounce.as_millis() as u64, "push scheduled");
        self.schedule();
    }
}
