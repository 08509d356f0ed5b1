// src/config/mod.rs
mod models;

pub use models::*;

use anyhow::{anyhow, Context, Result};
use std::fmt::Display;
use std::path::Path;
use std::str::FromStr;

/// Load settings from an optional file (YAML or JSON), then apply the
/// environment overrides (`STATUS_*`, `POSTGRES_*`, `REDIS_*`).
pub async fn load_config(path: Option<&Path>) -> Result<Settings> {
    let mut settings = match path {
        Some(path) => read_file(path).await?,
        None => Settings::default(),
    };

    let overrides = EnvOverrides::from_env()?;
    overrides.apply(&mut settings)?;

    settings.validate()?;
    Ok(settings)
}

async fn read_file(path: &Path) -> Result<Settings> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file {}", path.display()))?;

    let extension = path.extension().and_then(|s| s.to_str());
    let settings = if matches!(extension, Some("yaml") | Some("yml")) {
        serde_yaml::from_str(&contents).context("Failed to parse YAML config")?
    } else {
        serde_json::from_str(&contents).context("Failed to parse JSON config")?
    };
    Ok(settings)
}

/// Environment variables grouped by prefix: `STATUS_BIND_ADDR` is key
/// `bind_addr` of the `status` group, `POSTGRES_DB` is `db` of `postgres`.
pub struct EnvOverrides {
    status: config::Config,
    postgres: config::Config,
    redis: config::Config,
}

impl EnvOverrides {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            status: env_group("STATUS")?,
            postgres: env_group("POSTGRES")?,
            redis: env_group("REDIS")?,
        })
    }

    pub fn from_groups(
        status: config::Config,
        postgres: config::Config,
        redis: config::Config,
    ) -> Self {
        Self {
            status,
            postgres,
            redis,
        }
    }

    pub fn apply(&self, settings: &mut Settings) -> Result<()> {
        if let Some(addr) = string(&self.status, "bind_addr") {
            settings.server.bind_addr = addr;
        }
        parse_into(&self.status, "cache_ttl_secs", "STATUS_CACHE_TTL_SECS", &mut settings.cache.ttl_secs)?;
        parse_into(
            &self.status,
            "connect_timeout_secs",
            "STATUS_CONNECT_TIMEOUT_SECS",
            &mut settings.probes.connect_timeout_secs,
        )?;
        parse_into(
            &self.status,
            "probe_failure_policy",
            "STATUS_PROBE_FAILURE_POLICY",
            &mut settings.probes.failure_policy,
        )?;

        let pg = &mut settings.postgres;
        replace(&self.postgres, "host", &mut pg.host);
        parse_into(&self.postgres, "port", "POSTGRES_PORT", &mut pg.port)?;
        replace(&self.postgres, "user", &mut pg.user);
        replace(&self.postgres, "password", &mut pg.password);
        replace(&self.postgres, "db", &mut pg.database);

        let redis = &mut settings.redis;
        replace(&self.redis, "host", &mut redis.host);
        parse_into(&self.redis, "port", "REDIS_PORT", &mut redis.port)?;
        replace(&self.redis, "user", &mut redis.user);
        replace(&self.redis, "password", &mut redis.password);
        parse_optional(&self.redis, "db", "REDIS_DB", &mut redis.database)?;

        Ok(())
    }
}

fn env_group(prefix: &str) -> Result<config::Config> {
    config::Config::builder()
        .add_source(config::Environment::with_prefix(prefix))
        .build()
        .with_context(|| format!("Failed to read {}_* environment variables", prefix))
}

fn string(group: &config::Config, key: &str) -> Option<String> {
    group.get_string(key).ok()
}

fn replace(group: &config::Config, key: &str, target: &mut Option<String>) {
    if let Some(value) = string(group, key) {
        *target = Some(value);
    }
}

fn parse_into<T>(group: &config::Config, key: &str, var: &str, target: &mut T) -> Result<()>
where
    T: FromStr,
    T::Err: Display,
{
    if let Some(raw) = string(group, key) {
        *target = parse_var(var, &raw)?;
    }
    Ok(())
}

fn parse_optional<T>(group: &config::Config, key: &str, var: &str, target: &mut Option<T>) -> Result<()>
where
    T: FromStr,
    T::Err: Display,
{
    if let Some(raw) = string(group, key) {
        *target = Some(parse_var(var, &raw)?);
    }
    Ok(())
}

fn parse_var<T>(var: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    raw.trim()
        .parse()
        .map_err(|e| anyhow!("invalid value '{}' for {}: {}", raw, var, e))
}
