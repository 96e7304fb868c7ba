//! In-memory charger snapshot shared by every request.
//!
//! The full charger table is loaded once and reused until the TTL runs out.
//! When a refresh fails and an older snapshot exists, that snapshot is
//! served and flagged stale rather than failing the request. Refreshes are
//! serialized, so an expired snapshot triggers one reload, not one per
//! request.

use std::{future::Future, sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use echarger_core::ChargerRecord;
use tokio::{
    sync::{Mutex, RwLock},
    time::Instant,
};

#[derive(Debug)]
struct Snapshot {
    records: Arc<Vec<ChargerRecord>>,
    fetched_at: DateTime<Utc>,
    loaded_at: Instant,
}

impl Snapshot {
    fn new(records: Vec<ChargerRecord>) -> Self {
        Self {
            records: Arc::new(records),
            fetched_at: Utc::now(),
            loaded_at: Instant::now(),
        }
    }

    fn view(&self, stale: bool) -> CachedChargers {
        CachedChargers {
            records: Arc::clone(&self.records),
            fetched_at: self.fetched_at,
            stale,
        }
    }
}

/// What a lookup handed back: the records plus how fresh they are.
#[derive(Debug, Clone)]
pub struct CachedChargers {
    pub records: Arc<Vec<ChargerRecord>>,
    pub fetched_at: DateTime<Utc>,
    pub stale: bool,
}

#[derive(Debug, Default)]
struct State {
    snapshot: Option<Snapshot>,
    /// Bumped by `invalidate`; a load that began under an older generation
    /// is served to its caller but never cached.
    generation: u64,
}

#[derive(Debug, Clone)]
pub struct ChargerCache {
    ttl: Duration,
    state: Arc<RwLock<State>>,
    refresh: Arc<Mutex<()>>,
}

impl ChargerCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            state: Arc::new(RwLock::new(State::default())),
            refresh: Arc::new(Mutex::new(())),
        }
    }

    async fn fresh(&self) -> Option<CachedChargers> {
        let state = self.state.read().await;
        let hit = state
            .snapshot
            .as_ref()
            .filter(|snapshot| snapshot.loaded_at.elapsed() < self.ttl)
            .map(|snapshot| snapshot.view(false));
        hit
    }

    /// Return the current snapshot, calling `load` first if it is missing or
    /// older than the TTL.
    ///
    /// Only one refresh runs at a time; callers that arrive while it is in
    /// flight wait for it and reuse its result.
    ///
    /// # Errors
    ///
    /// Returns `load`'s error only when there is no earlier snapshot to fall
    /// back on.
    pub async fn get_or_refresh<F, Fut, E>(&self, load: F) -> Result<CachedChargers, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<ChargerRecord>, E>>,
        E: std::fmt::Display,
    {
        if let Some(hit) = self.fresh().await {
            return Ok(hit);
        }

        let _refreshing = self.refresh.lock().await;
        if let Some(hit) = self.fresh().await {
            return Ok(hit);
        }
        let generation = self.state.read().await.generation;

        match load().await {
            Ok(records) => Ok(self.store_if_current(records, generation).await),
            Err(e) => {
                let state = self.state.read().await;
                match state.snapshot.as_ref() {
                    Some(snapshot) => {
                        tracing::warn!(
                            error = %e,
                            fetched_at = %snapshot.fetched_at,
                            "charger refresh failed; serving stale snapshot"
                        );
                        Ok(snapshot.view(true))
                    }
                    None => Err(e),
                }
            }
        }
    }

    async fn store_if_current(&self, records: Vec<ChargerRecord>, generation: u64) -> CachedChargers {
        let snapshot = Snapshot::new(records);
        let view = snapshot.view(false);

        let mut state = self.state.write().await;
        if state.generation == generation {
            tracing::debug!(count = view.records.len(), "charger snapshot refreshed");
            state.snapshot = Some(snapshot);
        } else {
            tracing::debug!("cache invalidated during load; not keeping snapshot");
        }
        view
    }

    /// Replace the snapshot with `records`, stamped now.
    pub async fn store(&self, records: Vec<ChargerRecord>) -> CachedChargers {
        let snapshot = Snapshot::new(records);
        let view = snapshot.view(false);
        self.state.write().await.snapshot = Some(snapshot);
        view
    }

    /// Drop the snapshot so the next lookup reloads.
    pub async fn invalidate(&self) {
        let mut state = self.state.write().await;
        state.snapshot = None;
        state.generation = state.generation.wrapping_add(1);
    }
}
