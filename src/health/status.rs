// src/health/status.rs
use chrono::{DateTime, SecondsFormat, Utc};
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Outcome {
    Ok,
    Error,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Ok => "OK",
            Outcome::Error => "ERROR",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of checking one dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceStatus {
    name: String,
    outcome: Outcome,
    detail: String,
}

impl ServiceStatus {
    pub fn new(name: impl Into<String>, outcome: Outcome, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            outcome,
            detail: detail.into(),
        }
    }

    pub fn ok(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(name, Outcome::Ok, detail)
    }

    pub fn error(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(name, Outcome::Error, detail)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }

    pub fn is_ok(&self) -> bool {
        self.outcome == Outcome::Ok
    }
}

/// One complete health snapshot. Entries keep probe registration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedHealth {
    statuses: Vec<ServiceStatus>,
    checked_at: DateTime<Utc>,
}

impl AggregatedHealth {
    pub fn new(statuses: Vec<ServiceStatus>, checked_at: DateTime<Utc>) -> Self {
        Self {
            statuses,
            checked_at,
        }
    }

    pub fn statuses(&self) -> &[ServiceStatus] {
        &self.statuses
    }

    pub fn get(&self, name: &str) -> Option<&ServiceStatus> {
        self.statuses.iter().find(|s| s.name == name)
    }

    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }

    pub fn checked_at(&self) -> DateTime<Utc> {
        self.checked_at
    }

    /// `YYYY-MM-DD HH:MM:SS UTC`
    pub fn last_checked(&self) -> String {
        self.checked_at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
    }

    pub fn all_ok(&self) -> bool {
        self.statuses.iter().all(ServiceStatus::is_ok)
    }

    pub fn failures(&self) -> impl Iterator<Item = &ServiceStatus> {
        self.statuses.iter().filter(|s| !s.is_ok())
    }
}

impl Serialize for AggregatedHealth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("AggregatedHealth", 3)?;
        state.serialize_field("services", &Services(&self.statuses))?;
        state.serialize_field("last_checked", &self.last_checked())?;
        state.serialize_field(
            "timestamp",
            &self.checked_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        )?;
        state.end()
    }
}

struct Services<'a>(&'a [ServiceStatus]);

#[derive(Serialize)]
struct Entry<'a> {
    outcome: Outcome,
    detail: &'a str,
}

impl Serialize for Services<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for status in self.0 {
            map.serialize_entry(
                &status.name,
                &Entry {
                    outcome: status.outcome,
                    detail: &status.detail,
                },
            )?;
        }
        map.end()
    }
}
