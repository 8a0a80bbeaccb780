//! Application state shared across handlers

use sqlx::PgPool;

use crate::services::Services;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Absent when the services run on a store without a pool
    pub db_pool: Option<PgPool>,
    pub services: Services,
}
