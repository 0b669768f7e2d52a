use std::sync::Arc;

use sqlx::SqlitePool;

use crate::service::UserService;

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserService>,
    /// Storage handle, used directly only by the health check.
    pub db: SqlitePool,
}
