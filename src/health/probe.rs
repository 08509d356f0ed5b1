// src/health/probe.rs
use super::status::ServiceStatus;
use async_trait::async_trait;
use std::time::Duration;

/// Checks the reachability of one dependency.
///
/// `check` never fails: every error is folded into an ERROR status.
#[async_trait]
pub trait Probe: Send + Sync {
    fn name(&self) -> &str;

    async fn check(&self) -> ServiceStatus;
}

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("missing setting {0}")]
    MissingSetting(&'static str),

    #[error("connection timed out after {0:?}")]
    Timeout(Duration),

    #[error("invalid connection address: {0}")]
    InvalidAddress(String),

    #[error(transparent)]
    Postgres(#[from] sqlx::Error),

    #[error(transparent)]
    Redis(#[from] redis::RedisError),
}

pub(crate) const CONNECTION_OK: &str = "Connection successful.";

/// Folds a probe attempt into a status, logging the outcome.
pub(crate) fn into_status(
    name: &str,
    result: Result<(), ProbeError>,
    elapsed: Duration,
) -> ServiceStatus {
    match result {
        Ok(()) => {
            tracing::debug!(service = name, ?elapsed, "probe succeeded");
            ServiceStatus::ok(name, CONNECTION_OK)
        }
        Err(e) => {
            tracing::warn!(service = name, ?elapsed, error = %e, "probe failed");
            ServiceStatus::error(name, e.to_string())
        }
    }
}

/// Treats an empty setting the same as an absent one.
pub(crate) fn required<'a>(
    value: &'a Option<String>,
    var: &'static str,
) -> Result<&'a str, ProbeError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(ProbeError::MissingSetting(var))
}
