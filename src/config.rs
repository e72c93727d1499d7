use std::time::Duration;

use anyhow::{bail, Context};
use serde::Deserialize;

/// Which `FitnessStore` implementation backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl StoreBackend {
    pub fn as_str(self) -> &'static str {
        match self {
            StoreBackend::Postgres => "postgres",
            StoreBackend::Memory => "memory",
        }
    }
}

/// Bounded exponential backoff used while establishing the database pool.
#[derive(Debug, Clone, Deserialize)]
pub struct ReconnectPolicy {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl ReconnectPolicy {
    /// Delay before retry number `attempt` (1-based): base * 2^(attempt-1), capped.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u64.checked_shl(attempt.saturating_sub(1)).unwrap_or(u64::MAX);
        let ms = self.base_delay_ms.saturating_mul(factor).min(self.max_delay_ms);
        Duration::from_millis(ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub reconnect: ReconnectPolicy,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub backend: StoreBackend,
    pub database: Option<DatabaseConfig>,
    pub query_row_limit: i64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let backend = match std::env::var("STORE_BACKEND") {
            Ok(v) => parse_backend(&v)?,
            Err(_) => StoreBackend::Postgres,
        };

        let database = match backend {
            StoreBackend::Postgres => Some(DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .context("DATABASE_URL is required for the postgres backend")?,
                max_connections: env_or("DB_MAX_CONNECTIONS", 10),
                acquire_timeout_secs: env_or("DB_ACQUIRE_TIMEOUT_SECS", 5),
                reconnect: ReconnectPolicy {
                    max_retries: env_or("DB_CONNECT_RETRIES", 5),
                    base_delay_ms: env_or("DB_RETRY_BASE_MS", 500),
                    max_delay_ms: env_or("DB_RETRY_MAX_MS", 8000),
                },
            }),
            StoreBackend::Memory => None,
        };

        Ok(Self {
            backend,
            database,
            query_row_limit: env_or("QUERY_ROW_LIMIT", 1000),
        })
    }

    #[cfg(test)]
    pub fn in_memory() -> Self {
        Self {
            backend: StoreBackend::Memory,
            database: None,
            query_row_limit: 1000,
        }
    }
}

fn parse_backend(raw: &str) -> anyhow::Result<StoreBackend> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "postgres" | "pg" => Ok(StoreBackend::Postgres),
        "memory" => Ok(StoreBackend::Memory),
        other => bail!("unknown STORE_BACKEND `{other}` (expected postgres or memory)"),
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_names_parse_case_insensitively() {
        assert_eq!(parse_backend("Postgres").unwrap(), StoreBackend::Postgres);
        assert_eq!(parse_backend(" memory ").unwrap(), StoreBackend::Memory);
        assert!(parse_backend("mongo").is_err());
    }

    #[test]
    fn backoff_doubles_until_capped() {
        let policy = ReconnectPolicy {
            max_retries: 10,
            base_delay_ms: 500,
            max_delay_ms: 3000,
        };
        assert_eq!(policy.delay_for(1), Duration::from_millis(500));
        assert_eq!(policy.delay_for(2), Duration::from_millis(1000));
        assert_eq!(policy.delay_for(3), Duration::from_millis(2000));
        assert_eq!(policy.delay_for(4), Duration::from_millis(3000));
        assert_eq!(policy.delay_for(80), Duration::from_millis(3000));
    }
}
