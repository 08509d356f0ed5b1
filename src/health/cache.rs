// src/health/cache.rs
use super::status::AggregatedHealth;
use crate::error::StatusError;
use arc_swap::ArcSwapOption;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

/// Holds the latest health snapshot.
///
/// The snapshot sits behind an `ArcSwapOption`: `replace` publishes a whole
/// new `Arc`, so readers see either the previous snapshot or the new one,
/// never a mix.
pub struct HealthCache {
    current: ArcSwapOption<AggregatedHealth>,
    ttl: Duration,
}

impl HealthCache {
    pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

    pub fn new(ttl: Duration) -> Self {
        Self {
            current: ArcSwapOption::empty(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn is_populated(&self) -> bool {
        self.current.load().is_some()
    }

    /// True when empty, or when the snapshot is older than the TTL at `now`.
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        self.fresh_at(now).is_none()
    }

    /// The cached snapshot, if one exists and is within the TTL at `now`.
    ///
    /// Staleness and the returned value come from the same load.
    pub fn fresh_at(&self, now: DateTime<Utc>) -> Option<Arc<AggregatedHealth>> {
        let snapshot = self.current.load_full()?;
        // A snapshot stamped after `now` has a negative age and counts as fresh.
        let expired = match (now - snapshot.checked_at()).to_std() {
            Ok(age) => age > self.ttl,
            Err(_) => false,
        };
        (!expired).then_some(snapshot)
    }

    pub fn read(&self) -> Result<Arc<AggregatedHealth>, StatusError> {
        self.current.load_full().ok_or(StatusError::CacheEmpty)
    }

    /// Publish `snapshot` unless the cache already holds a newer one.
    ///
    /// Overlapping aggregations finish in any order; the snapshot with the
    /// later `checked_at` wins. Returns whether `snapshot` was stored.
    pub fn replace(&self, snapshot: Arc<AggregatedHealth>) -> bool {
        let mut stored = false;
        self.current.rcu(|current| match current {
            Some(existing) if existing.checked_at() > snapshot.checked_at() => {
                stored = false;
                Some(existing.clone())
            }
            _ => {
                stored = true;
                Some(snapshot.clone())
            }
        });

        if stored {
            tracing::debug!(
                services = snapshot.len(),
                checked_at = %snapshot.last_checked(),
                "health cache replaced"
            );
        } else {
            tracing::debug!(
                checked_at = %snapshot.last_checked(),
                "newer snapshot already cached, discarding"
            );
        }
        stored
    }
}

impl Default for HealthCache {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TTL)
    }
}
