//! peopler - a small CRUD service for user records.
//!
//! Requests flow handler → [`service::UserService`] →
//! [`repository::UserRepository`] → SQLite.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod otel;
pub mod repository;
pub mod routes;
pub mod service;
pub mod state;
pub mod telemetry;

pub use config::Config;
pub use models::User;
pub use routes::create_router;
pub use state::AppState;

use std::{future::Future, sync::Arc};

use anyhow::Context;
use sqlx::SqlitePool;
use tokio::net::TcpListener;

use crate::{repository::SqliteUserRepository, service::PeopleService};

/// Wires repository, service and router state around an open pool.
pub fn build_state(pool: SqlitePool) -> AppState {
    let repository = Arc::new(SqliteUserRepository::new(pool.clone()));
    let service = PeopleService::new(repository);

    AppState {
        users: Arc::new(service),
        db: pool,
    }
}

/// Serves the API on `listener` until `shutdown` resolves, then closes the
/// pool. The pool is closed even when the server fails.
pub async fn serve<F>(listener: TcpListener, pool: SqlitePool, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = create_router(build_state(pool.clone()));
    let result = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("Server error");

    pool.close().await;
    result
}
