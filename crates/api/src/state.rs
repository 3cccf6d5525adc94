use std::sync::Arc;

use wabiz_meta::MetaApi;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: wabiz_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Graph API client. Owner access tokens are passed per call.
    pub meta: Arc<MetaApi>,
}

impl AppState {
    pub fn new(pool: wabiz_db::DbPool, config: ServerConfig) -> Self {
        let meta = Arc::new(MetaApi::new(config.meta.clone()));
        Self {
            pool,
            config: Arc::new(config),
            meta,
        }
    }
}
