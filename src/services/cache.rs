//! Time-bounded snapshot cache with an injectable clock.

use crate::models::snapshot::Snapshot;
use crate::services::market_data::MacroDataProvider;
use chrono::{DateTime, Utc};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
pub struct ManualClock {
    now: RwLock<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(start),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.write().unwrap_or_else(|e| e.into_inner()) = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.write().unwrap_or_else(|e| e.into_inner());
        if let Ok(delta) = chrono::Duration::from_std(by) {
            *now += delta;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read().unwrap_or_else(|e| e.into_inner())
    }
}

struct CachedSnapshot {
    snapshot: Arc<Snapshot>,
    fetched_at: DateTime<Utc>,
}

/// Serves the provider's snapshot until it is older than the TTL.
///
/// Callers that miss the cache at the same time wait on one fetch. A zero
/// TTL fetches on every call.
pub struct SnapshotCache {
    provider: Arc<dyn MacroDataProvider>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    entry: Mutex<Option<CachedSnapshot>>,
}

impl SnapshotCache {
    pub fn new(provider: Arc<dyn MacroDataProvider>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            provider,
            clock,
            ttl,
            entry: Mutex::new(None),
        }
    }

    pub fn with_system_clock(provider: Arc<dyn MacroDataProvider>, ttl: Duration) -> Self {
        Self::new(provider, Arc::new(SystemClock), ttl)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn get(&self) -> Arc<Snapshot> {
        let mut entry = self.entry.lock().await;
        let now = self.clock.now();

        if let Some(cached) = entry.as_ref() {
            if self.is_fresh(cached.fetched_at, now) {
                debug!(fetched_at = %cached.fetched_at, "SnapshotCache: hit");
                return cached.snapshot.clone();
            }
        }

        debug!("SnapshotCache: miss, fetching snapshot");
        let snapshot = Arc::new(self.provider.fetch_snapshot().await);
        *entry = Some(CachedSnapshot {
            snapshot: snapshot.clone(),
            fetched_at: now,
        });
        snapshot
    }

    /// Drop the cached entry so the next `get` fetches.
    pub async fn invalidate(&self) {
        self.entry.lock().await.take();
    }

    pub async fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.entry.lock().await.as_ref().map(|c| c.fetched_at)
    }

    fn is_fresh(&self, fetched_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        if self.ttl.is_zero() {
            return false;
        }
        match chrono::Duration::from_std(self.ttl) {
            Ok(ttl) => now - fetched_at < ttl,
            Err(_) => true,
        }
    }
}
