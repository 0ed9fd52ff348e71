//! Shared application state.

use std::sync::Arc;

use vreg_db::Database;

use crate::auth::JwtManager;
use crate::config::ApiConfig;

/// State shared by every handler. Cloning is cheap; the database pool and
/// JWT manager are reference-counted.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub jwt: Arc<JwtManager>,
    pub config: Arc<ApiConfig>,
}

impl AppState {
    /// Assembles the shared state from a connected database and the
    /// loaded configuration.
    pub fn new(db: Database, config: ApiConfig) -> Self {
        let jwt = Arc::new(JwtManager::new(
            config.jwt_secret.clone(),
            config.jwt_lifetime_secs,
        ));

        AppState {
            db,
            jwt,
            config: Arc::new(config),
        }
    }
}
