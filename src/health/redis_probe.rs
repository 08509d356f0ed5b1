// src/health/redis_probe.rs
use super::probe::{into_status, required, Probe, ProbeError};
use super::status::ServiceStatus;
use crate::config::RedisConfig;
use async_trait::async_trait;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use url::Url;

/// Connects to Redis and issues a `PING` per check.
pub struct RedisProbe {
    config: RedisConfig,
    connect_timeout: Duration,
}

impl RedisProbe {
    pub const NAME: &'static str = "Redis";

    pub fn new(config: RedisConfig, connect_timeout: Duration) -> Self {
        Self {
            config,
            connect_timeout,
        }
    }

    /// `redis://[user][:password@]host:port[/db]`, credentials percent-encoded.
    pub fn connection_url(&self) -> Result<Url, ProbeError> {
        let host = required(&self.config.host, "REDIS_HOST")?;
        let invalid = |what: &str| ProbeError::InvalidAddress(format!("{} for host '{}'", what, host));

        let mut url = Url::parse("redis://localhost")
            .map_err(|e| ProbeError::InvalidAddress(e.to_string()))?;
        url.set_host(Some(host))
            .map_err(|e| ProbeError::InvalidAddress(format!("{}: {}", host, e)))?;
        url.set_port(Some(self.config.port))
            .map_err(|_| invalid("cannot set port"))?;
        if let Some(user) = &self.config.user {
            url.set_username(user).map_err(|_| invalid("cannot set username"))?;
        }
        if let Some(password) = &self.config.password {
            url.set_password(Some(password))
                .map_err(|_| invalid("cannot set password"))?;
        }
        if let Some(db) = self.config.database {
            url.set_path(&format!("/{}", db));
        }
        Ok(url)
    }

    async fn ping(&self) -> Result<(), ProbeError> {
        let url = self.connection_url()?;
        let client = redis::Client::open(url.as_str())?;

        let mut conn = timeout(self.connect_timeout, client.get_multiplexed_async_connection())
            .await
            .map_err(|_| ProbeError::Timeout(self.connect_timeout))??;

        let _pong: String = timeout(self.connect_timeout, redis::cmd("PING").query_async(&mut conn))
            .await
            .map_err(|_| ProbeError::Timeout(self.connect_timeout))??;

        Ok(())
    }
}

#[async_trait]
impl Probe for RedisProbe {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn check(&self) -> ServiceStatus {
        let start = Instant::now();
        let result = self.ping().await;
        into_status(Self::NAME, result, start.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::Outcome;

    fn config(host: &str) -> RedisConfig {
        RedisConfig {
            host: Some(host.to_string()),
            ..RedisConfig::default()
        }
    }

    #[test]
    fn test_connection_url_defaults() {
        let probe = RedisProbe::new(config("cache.internal"), Duration::from_secs(5));
        let url = probe.connection_url().unwrap();
        assert_eq!(url.as_str(), "redis://cache.internal:6379");
    }

    #[test]
    fn test_connection_url_encodes_credentials() {
        let mut config = config("cache.internal");
        config.user = Some("status".to_string());
        config.password = Some("p@ss/word".to_string());
        config.database = Some(3);

        let url = RedisProbe::new(config, Duration::from_secs(5))
            .connection_url()
            .unwrap();
        assert_eq!(url.username(), "status");
        assert_eq!(url.password(), Some("p%40ss%2Fword"));
        assert_eq!(url.path(), "/3");
    }

    #[tokio::test]
    async fn test_missing_host_reports_error() {
        let probe = RedisProbe::new(RedisConfig::default(), Duration::from_secs(1));
        let status = probe.check().await;

        assert_eq!(status.name(), "Redis");
        assert_eq!(status.outcome(), Outcome::Error);
        assert_eq!(status.detail(), "missing setting REDIS_HOST");
    }

    #[tokio::test]
    async fn test_silent_server_times_out() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((stream, _)) = listener.accept().await {
                held.push(stream);
            }
        });

        let mut config = config("127.0.0.1");
        config.port = addr.port();
        let start = Instant::now();
        let status = RedisProbe::new(config, Duration::from_millis(300)).check().await;
        let elapsed = start.elapsed();

        assert_eq!(status.outcome(), Outcome::Error);
        assert_eq!(status.detail(), "connection timed out after 300ms");
        // Connect and PING are each bounded by the timeout.
        assert!(elapsed >= Duration::from_millis(300));
        assert!(elapsed < Duration::from_secs(2), "took {:?}", elapsed);
    }

    #[tokio::test]
    async fn test_unresolvable_host_reports_error() {
        let status = RedisProbe::new(config("no-such-host.invalid"), Duration::from_secs(2))
            .check()
            .await;

        assert_eq!(status.outcome(), Outcome::Error);
        assert!(!status.detail().is_empty());
        assert!(!status.detail().starts_with("missing setting"));
    }

    #[tokio::test]
    async fn test_unreachable_server_reports_error() {
        let mut config = config("127.0.0.1");
        config.port = 1;
        let status = RedisProbe::new(config, Duration::from_secs(2)).check().await;

        assert_eq!(status.outcome(), Outcome::Error);
        assert!(!status.detail().is_empty());
    }
}
