// src/health/postgres_probe.rs
use super::probe::{into_status, required, Probe, ProbeError};
use super::status::ServiceStatus;
use crate::config::PostgresConfig;
use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::Connection;
use std::time::{Duration, Instant};
use tokio::time::timeout;

/// Opens and closes one PostgreSQL connection per check.
pub struct PostgresProbe {
    config: PostgresConfig,
    connect_timeout: Duration,
}

impl PostgresProbe {
    pub const NAME: &'static str = "PostgreSQL";

    pub fn new(config: PostgresConfig, connect_timeout: Duration) -> Self {
        Self {
            config,
            connect_timeout,
        }
    }

    /// Connection options built from settings alone.
    ///
    /// Every field is set explicitly so `PG*` variables and `.pgpass` in the
    /// process environment never stand in for missing settings.
    fn connect_options(&self) -> Result<PgConnectOptions, ProbeError> {
        let host = required(&self.config.host, "POSTGRES_HOST")?;
        let user = required(&self.config.user, "POSTGRES_USER")?;
        // Postgres' own default: a database named after the user.
        let database = self.config.database.as_deref().unwrap_or(user);

        Ok(PgConnectOptions::new_without_pgpass()
            .host(host)
            .port(self.config.port)
            .username(user)
            .password(self.config.password.as_deref().unwrap_or(""))
            .database(database))
    }

    async fn connect(&self) -> Result<(), ProbeError> {
        let options = self.connect_options()?;

        // Dropping the future on timeout tears down the half-open socket.
        let conn = timeout(self.connect_timeout, PgConnection::connect_with(&options))
            .await
            .map_err(|_| ProbeError::Timeout(self.connect_timeout))??;

        conn.close().await?;
        Ok(())
    }
}

#[async_trait]
impl Probe for PostgresProbe {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn check(&self) -> ServiceStatus {
        let start = Instant::now();
        let result = self.connect().await;
        into_status(Self::NAME, result, start.elapsed())
    }
}
