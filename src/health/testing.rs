// src/health/testing.rs
use super::probe::Probe;
use super::status::{Outcome, ServiceStatus};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Probe with a fixed answer, an optional delay and a call counter.
pub struct ScriptedProbe {
    name: String,
    reported_name: String,
    outcome: Outcome,
    detail: String,
    delay: Option<Duration>,
    first_call_only: bool,
    calls: Arc<AtomicUsize>,
}

impl ScriptedProbe {
    pub fn ok(name: &str) -> Self {
        Self::new(name, Outcome::Ok, "Connection successful.")
    }

    pub fn error(name: &str, detail: &str) -> Self {
        Self::new(name, Outcome::Error, detail)
    }

    pub fn reporting_as(name: &str, reported: &str) -> Self {
        let mut probe = Self::ok(name);
        probe.reported_name = reported.to_string();
        probe
    }

    fn new(name: &str, outcome: Outcome, detail: &str) -> Self {
        Self {
            name: name.to_string(),
            reported_name: name.to_string(),
            outcome,
            detail: detail.to_string(),
            delay: None,
            first_call_only: false,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Delay only the first `check`; later calls answer at once.
    pub fn with_first_call_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self.first_call_only = true;
        self
    }

    pub fn counter(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

#[async_trait]
impl Probe for ScriptedProbe {
    fn name(&self) -> &str {
        &self.name
    }

    async fn check(&self) -> ServiceStatus {
        let previous = self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            if !self.first_call_only || previous == 0 {
                tokio::time::sleep(delay).await;
            }
        }
        ServiceStatus::new(&self.reported_name, self.outcome, &self.detail)
    }
}

pub struct PanickingProbe {
    name: String,
}

impl PanickingProbe {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

#[async_trait]
impl Probe for PanickingProbe {
    fn name(&self) -> &str {
        &self.name
    }

    async fn check(&self) -> ServiceStatus {
        panic!("{} probe crashed", self.name);
    }
}
