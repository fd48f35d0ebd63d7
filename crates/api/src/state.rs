use std::sync::Arc;

use lingo_db::PgStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone: everything is behind an `Arc` or is a pool handle.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: lingo_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Store backing every use case.
    pub store: Arc<PgStore>,
}

impl AppState {
    pub fn new(pool: lingo_db::DbPool, config: ServerConfig) -> Self {
        let store = Arc::new(PgStore::new(pool.clone()));
        Self {
            pool,
            config: Arc::new(config),
            store,
        }
    }
}
