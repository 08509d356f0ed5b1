// src/health/mod.rs
mod aggregator;
mod cache;
mod gate;
mod postgres_probe;
mod probe;
mod redis_probe;
mod status;

#[cfg(test)]
pub(crate) mod testing;

pub use aggregator::Aggregator;
pub use cache::HealthCache;
pub use gate::{startup_gate, StartupError};
pub use postgres_probe::PostgresProbe;
pub use probe::{Probe, ProbeError};
pub use redis_probe::RedisProbe;
pub use status::{AggregatedHealth, Outcome, ServiceStatus};

use crate::config::Settings;
use std::sync::Arc;

/// The dependency probes in registration order: PostgreSQL, then Redis.
pub fn default_probes(settings: &Settings) -> Vec<Arc<dyn Probe>> {
    let connect_timeout = settings.probes.connect_timeout();
    vec![
        Arc::new(PostgresProbe::new(settings.postgres.clone(), connect_timeout)),
        Arc::new(RedisProbe::new(settings.redis.clone(), connect_timeout)),
    ]
}

/// Builds the aggregator over `cache` with the configured probes and policy.
///
/// Each probe gets one second on top of its connect timeout before the
/// aggregator gives up on it.
pub fn build_aggregator(
    settings: &Settings,
    cache: Arc<HealthCache>,
) -> Result<Aggregator, crate::error::StatusError> {
    let mut aggregator = Aggregator::new(cache)
        .with_failure_policy(settings.probes.failure_policy)
        .with_probe_timeout(settings.probes.connect_timeout() + std::time::Duration::from_secs(1));

    for probe in default_probes(settings) {
        aggregator.register(probe)?;
    }
    Ok(aggregator)
}
