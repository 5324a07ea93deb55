//! Shared application state for the axum router.

use crate::config::{CatalogConfig, JwtConfig};
use crate::db::AsyncDbPool;
use crate::repositories::Repositories;
use crate::services::Services;

/// State handed to every handler.
///
/// Cloning is cheap since both Services and AsyncDbPool use Arc internally.
#[derive(Clone)]
pub struct AppState {
    pub services: Services,
    /// Direct pool access for health checks
    pub db_pool: AsyncDbPool,
    pub jwt_config: JwtConfig,
}

impl AppState {
    /// Wires repositories and services over `pool`.
    pub fn new(pool: AsyncDbPool, jwt_config: JwtConfig, catalog: CatalogConfig) -> Self {
        let repos = Repositories::new(pool.clone());
        let services = Services::new(repos, catalog);
        Self {
            services,
            db_pool: pool,
            jwt_config,
        }
    }
}
