// src/query.rs
use crate::health::{AggregatedHealth, Aggregator, HealthCache};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// The two read paths used by the HTTP layer.
pub struct StatusService {
    aggregator: Arc<Aggregator>,
    // Held while a stale-triggered refresh runs.
    refresh_lock: Mutex<()>,
}

impl StatusService {
    pub fn new(aggregator: Arc<Aggregator>) -> Self {
        Self {
            aggregator,
            refresh_lock: Mutex::new(()),
        }
    }

    pub fn cache(&self) -> &HealthCache {
        self.aggregator.cache()
    }

    /// Cached snapshot, refreshed first when older than the TTL.
    pub async fn cached(&self) -> Arc<AggregatedHealth> {
        self.cached_at(Utc::now()).await
    }

    /// As [`cached`](Self::cached), judging staleness at `now`.
    ///
    /// Concurrent callers that find the cache stale queue on the refresh
    /// lock; the first one refreshes and the rest pick up its snapshot.
    pub async fn cached_at(&self, now: DateTime<Utc>) -> Arc<AggregatedHealth> {
        if let Some(snapshot) = self.cache().fresh_at(now) {
            return snapshot;
        }

        let _guard = self.refresh_lock.lock().await;
        if let Some(snapshot) = self.cache().fresh_at(now) {
            debug!("cache refreshed by a concurrent request");
            return snapshot;
        }

        debug!("cache stale, refreshing");
        self.aggregator.run_all().await
    }

    /// Always runs a new aggregation; also refreshes the cache.
    pub async fn fresh(&self) -> Arc<AggregatedHealth> {
        self.aggregator.run_all().await
    }
}
