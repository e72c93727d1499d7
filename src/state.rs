use std::sync::Arc;

use crate::config::{AppConfig, StoreBackend};
use crate::db;
use crate::store::{FitnessStore, MemoryStore, PgStore, DEMO_USER_ID};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn FitnessStore>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let store = match (config.backend, &config.database) {
            (StoreBackend::Postgres, Some(db_cfg)) => {
                let pool = db::connect(db_cfg).await?;
                db::migrate(&pool).await?;
                Arc::new(PgStore::new(pool)) as Arc<dyn FitnessStore>
            }
            (StoreBackend::Postgres, None) => {
                anyhow::bail!("postgres backend selected without database settings")
            }
            (StoreBackend::Memory, _) => {
                tracing::warn!("using in-memory store; data is lost on restart");
                tracing::info!(demo_user_id = %DEMO_USER_ID, "seeded demo user and workout templates");
                Arc::new(MemoryStore::with_demo_data()) as Arc<dyn FitnessStore>
            }
        };

        Ok(Self { store, config })
    }

    pub fn from_parts(store: Arc<dyn FitnessStore>, config: Arc<AppConfig>) -> Self {
        Self { store, config }
    }

    /// Row cap for aggregation reads.
    pub fn row_limit(&self) -> i64 {
        self.config.query_row_limit
    }
}
