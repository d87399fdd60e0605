use std::sync::Arc;

use crate::auth::{
    repo::{MemUserRepository, PgUserRepository, UserRepository},
    session::SessionStore,
};
use crate::config::AppConfig;
use crate::contact::repo::{ContactRepository, MemContactRepository, PgContactRepository};
use crate::db;
use crate::profiles::repo::{MemProfileRepository, PgProfileRepository, ProfileRepository};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserRepository>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub contacts: Arc<dyn ContactRepository>,
    pub sessions: SessionStore,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;

        let Some(url) = config.database_url.clone() else {
            tracing::warn!("DATABASE_URL not set; using volatile in-memory storage");
            return Ok(Self::in_memory(config));
        };

        let pool = db::connect(&url).await?;
        db::migrate(&pool).await?;
        let sessions = SessionStore::new(time::Duration::minutes(config.session.ttl_minutes));

        Ok(Self {
            config: Arc::new(config),
            users: Arc::new(PgUserRepository::new(pool.clone())),
            profiles: Arc::new(PgProfileRepository::new(pool.clone())),
            contacts: Arc::new(PgContactRepository::new(pool)),
            sessions,
        })
    }

    pub fn in_memory(config: AppConfig) -> Self {
        let sessions = SessionStore::new(time::Duration::minutes(config.session.ttl_minutes));
        Self {
            config: Arc::new(config),
            users: Arc::new(MemUserRepository::new()),
            profiles: Arc::new(MemProfileRepository::new()),
            contacts: Arc::new(MemContactRepository::new()),
            sessions,
        }
    }

    /// In-memory state with default settings, for tests.
    pub fn fake() -> Self {
        Self::in_memory(AppConfig::default())
    }
}
