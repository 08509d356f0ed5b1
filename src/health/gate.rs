// src/health/gate.rs
use super::aggregator::Aggregator;
use super::status::{AggregatedHealth, ServiceStatus};
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("initial health check failed for {}", describe(.failures))]
    DependenciesUnavailable { failures: Vec<ServiceStatus> },
}

impl StartupError {
    pub fn failures(&self) -> &[ServiceStatus] {
        match self {
            StartupError::DependenciesUnavailable { failures } => failures,
        }
    }

    pub fn exit_code(&self) -> i32 {
        1
    }
}

fn describe(failures: &[ServiceStatus]) -> String {
    failures
        .iter()
        .map(|s| format!("{}: {}", s.name(), s.detail()))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Populates the cache once and refuses to continue if any dependency is
/// down. Runs before the server binds.
pub async fn startup_gate(aggregator: &Aggregator) -> Result<Arc<AggregatedHealth>, StartupError> {
    let snapshot = aggregator.run_all().await;

    let failures: Vec<ServiceStatus> = snapshot.failures().cloned().collect();
    if failures.is_empty() {
        Ok(snapshot)
    } else {
        Err(StartupError::DependenciesUnavailable { failures })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FailurePolicy;
    use crate::health::testing::ScriptedProbe;
    use crate::health::HealthCache;

    fn aggregator() -> Aggregator {
        Aggregator::new(Arc::new(HealthCache::default()))
    }

    #[tokio::test]
    async fn test_all_ok_passes_and_populates_cache() {
        let aggregator = aggregator()
            .with_probe(Arc::new(ScriptedProbe::ok("PostgreSQL")))
            .unwrap()
            .with_probe(Arc::new(ScriptedProbe::ok("Redis")))
            .unwrap();

        let snapshot = startup_gate(&aggregator).await.unwrap();
        assert!(snapshot.all_ok());
        assert!(aggregator.cache().is_populated());
    }

    #[tokio::test]
    async fn test_any_error_refuses_startup() {
        let aggregator = aggregator()
            .with_probe(Arc::new(ScriptedProbe::ok("PostgreSQL")))
            .unwrap()
            .with_probe(Arc::new(ScriptedProbe::error("Redis", "NOAUTH Authentication required.")))
            .unwrap();

        let err = startup_gate(&aggregator).await.unwrap_err();
        assert_eq!(err.exit_code(), 1);
        assert_eq!(err.failures().len(), 1);
        assert_eq!(
            err.to_string(),
            "initial health check failed for Redis: NOAUTH Authentication required."
        );
    }

    #[tokio::test]
    async fn test_fail_open_lets_startup_proceed() {
        let aggregator = aggregator()
            .with_failure_policy(FailurePolicy::FailOpen)
            .with_probe(Arc::new(ScriptedProbe::error("PostgreSQL", "refused")))
            .unwrap();

        assert!(startup_gate(&aggregator).await.is_ok());
    }
}
