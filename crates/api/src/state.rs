use std::sync::Arc;

use crate::config::AppConfig;
use crate::storage::MediaStore;

/// Shared application state available to all Axum handlers via
/// `State<AppState>`. Cheaply cloneable.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: barberlab_db::DbPool,
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Stored-media access (uploads, catalog images, results).
    pub media: MediaStore,
}

impl AppState {
    pub fn new(pool: barberlab_db::DbPool, config: AppConfig) -> Self {
        let media = MediaStore::new(config.playground.media_root.clone());
        Self {
            pool,
            config: Arc::new(config),
            media,
        }
    }
}
