use std::time::Duration;

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::{info, warn};

use crate::config::DatabaseConfig;

/// Opens the pool, retrying with exponential backoff until the policy is exhausted.
pub async fn connect(cfg: &DatabaseConfig) -> anyhow::Result<PgPool> {
    let options = PgPoolOptions::new()
        .max_connections(cfg.max_connections)
        .acquire_timeout(Duration::from_secs(cfg.acquire_timeout_secs));

    let mut attempt = 0;
    loop {
        match options.clone().connect(&cfg.url).await {
            Ok(pool) => {
                info!(attempt, "database connected");
                return Ok(pool);
            }
            Err(e) if attempt < cfg.reconnect.max_retries => {
                attempt += 1;
                let delay = cfg.reconnect.delay_for(attempt);
                warn!(
                    error = %e,
                    attempt,
                    max_retries = cfg.reconnect.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    "database connect failed; retrying"
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("connect to database after {} retries", cfg.reconnect.max_retries)
                })
            }
        }
    }
}

pub async fn migrate(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("run migrations")?;
    Ok(())
}
