// src/health/aggregator.rs
use super::cache::HealthCache;
use super::probe::Probe;
use super::status::{AggregatedHealth, Outcome, ServiceStatus};
use crate::config::FailurePolicy;
use crate::error::StatusError;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{error, info, warn};

/// Runs every registered probe and publishes the result to the cache.
pub struct Aggregator {
    probes: Vec<Arc<dyn Probe>>,
    cache: Arc<HealthCache>,
    failure_policy: FailurePolicy,
    probe_timeout: Duration,
}

impl Aggregator {
    /// Upper bound for a single probe when none is configured.
    pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(6);

    pub fn new(cache: Arc<HealthCache>) -> Self {
        Self {
            probes: Vec::new(),
            cache,
            failure_policy: FailurePolicy::default(),
            probe_timeout: Self::DEFAULT_PROBE_TIMEOUT,
        }
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Hard limit per probe, on top of the probe's own connect timeout.
    pub fn with_probe_timeout(mut self, limit: Duration) -> Self {
        self.probe_timeout = limit;
        self
    }

    pub fn with_probe(mut self, probe: Arc<dyn Probe>) -> Result<Self, StatusError> {
        self.register(probe)?;
        Ok(self)
    }

    pub fn register(&mut self, probe: Arc<dyn Probe>) -> Result<(), StatusError> {
        if self.probes.iter().any(|p| p.name() == probe.name()) {
            return Err(StatusError::DuplicateProbe(probe.name().to_string()));
        }
        self.probes.push(probe);
        Ok(())
    }

    pub fn probe_names(&self) -> impl Iterator<Item = &str> {
        self.probes.iter().map(|p| p.name())
    }

    pub fn cache(&self) -> &Arc<HealthCache> {
        &self.cache
    }

    /// Checks all dependencies concurrently and replaces the cached snapshot.
    ///
    /// Never fails: a probe that times out or panics is recorded as ERROR
    /// under its registered name. `checked_at` is the time the run started.
    pub async fn run_all(&self) -> Arc<AggregatedHealth> {
        let checked_at = Utc::now();
        let limit = self.probe_timeout;

        let tasks: Vec<_> = self
            .probes
            .iter()
            .map(|probe| {
                let probe = probe.clone();
                tokio::spawn(async move { timeout(limit, probe.check()).await })
            })
            .collect();

        let results = futures::future::join_all(tasks).await;

        let statuses: Vec<ServiceStatus> = self
            .probes
            .iter()
            .zip(results)
            .map(|(probe, result)| {
                let name = probe.name();
                let status = match result {
                    Ok(Ok(status)) if status.name() == name => status,
                    Ok(Ok(status)) => {
                        warn!(service = name, reported = status.name(), "probe reported under a different name");
                        ServiceStatus::new(name, status.outcome(), status.detail())
                    }
                    Ok(Err(_)) => {
                        warn!(service = name, ?limit, "probe exceeded its time limit");
                        ServiceStatus::error(name, format!("probe timed out after {:?}", limit))
                    }
                    Err(e) => {
                        error!(service = name, error = %e, "probe task failed");
                        ServiceStatus::error(name, format!("probe task failed: {}", e))
                    }
                };
                self.apply_policy(status)
            })
            .collect();

        let snapshot = Arc::new(AggregatedHealth::new(statuses, checked_at));
        self.cache.replace(snapshot.clone());

        let failed = snapshot.failures().count();
        info!(
            "Health check complete: {} ok, {} failed",
            snapshot.len() - failed,
            failed
        );

        snapshot
    }

    fn apply_policy(&self, status: ServiceStatus) -> ServiceStatus {
        match (self.failure_policy, status.outcome()) {
            (FailurePolicy::FailOpen, Outcome::Error) => {
                warn!(
                    service = status.name(),
                    detail = status.detail(),
                    "reporting failed probe as OK under fail-open policy"
                );
                ServiceStatus::ok(status.name(), format!("unverified: {}", status.detail()))
            }
            _ => status,
        }
    }
}
