use sqlx::SqlitePool;

use crate::config::Config;
use crate::store::SessionStore;

#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionStore,
    pub config: Config,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: Config) -> Self {
        Self {
            sessions: SessionStore::new(pool, config.otp_ttl_secs),
            config,
        }
    }
}
