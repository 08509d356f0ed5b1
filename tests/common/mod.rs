// tests/common/mod.rs
#![allow(dead_code)]

use async_trait::async_trait;
use service_status::health::{Outcome, Probe, ServiceStatus};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub struct FixedProbe {
    name: &'static str,
    outcome: Outcome,
    detail: &'static str,
    delay: Option<Duration>,
    pub calls: Arc<AtomicUsize>,
}

impl FixedProbe {
    pub fn ok(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            outcome: Outcome::Ok,
            detail: "Connection successful.",
            delay: None,
            calls: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn error(name: &'static str, detail: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            outcome: Outcome::Error,
            detail,
            delay: None,
            calls: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Answers OK after `delay`.
    pub fn slow(name: &'static str, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            name,
            outcome: Outcome::Ok,
            detail: "Connection successful.",
            delay: Some(delay),
            calls: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Probe for FixedProbe {
    fn name(&self) -> &str {
        self.name
    }

    async fn check(&self) -> ServiceStatus {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        ServiceStatus::new(self.name, self.outcome, self.detail)
    }
}
