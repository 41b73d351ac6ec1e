use std::sync::Arc;

use anyhow::Context;
use sqlx::PgPool;
use tracing::{info, warn};

use crate::config::Config;
use crate::db::memory::{MemoryHelpfulVoteStore, MemoryReviewStore};
use crate::db::pool::{get_db_pool, run_migrations};
use crate::db::queries::helpful_vote::PgHelpfulVoteStore;
use crate::db::queries::review::PgReviewStore;
use crate::db::store::{HelpfulVoteStore, ReviewStore};

#[derive(Clone)]
pub struct AppState {
    pub reviews: Arc<dyn ReviewStore>,
    pub votes: Arc<dyn HelpfulVoteStore>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Picks storage from `config.database_url`.
    ///
    /// With a URL: connects, migrates and returns the pool for shutdown.
    /// Without one: in-memory stores, announced with a warning.
    pub async fn connect(config: Config) -> anyhow::Result<(Self, Option<PgPool>)> {
        match config.database_url.clone() {
            Some(database_url) => {
                let pool = get_db_pool(&database_url)
                    .await
                    .context("Failed to connect to the database")?;
                run_migrations(&pool).await.context("Failed to run migrations")?;
                info!("✅ Reviews stored in PostgreSQL");
                Ok((Self::postgres(pool.clone(), config), Some(pool)))
            }
            None => {
                warn!("DATABASE_URL not set, reviews will be kept in memory and lost on restart");
                Ok((Self::in_memory(config), None))
            }
        }
    }

    pub fn postgres(pool: PgPool, config: Config) -> Self {
        Self {
            reviews: Arc::new(PgReviewStore::new(pool.clone())),
            votes: Arc::new(PgHelpfulVoteStore::new(pool)),
            config: Arc::new(config),
        }
    }

    pub fn in_memory(config: Config) -> Self {
        Self {
            reviews: Arc::new(MemoryReviewStore::new()),
            votes: Arc::new(MemoryHelpfulVoteStore::new()),
            config: Arc::new(config),
        }
    }
}
