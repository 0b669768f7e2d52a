use axum::{
    Router,
    routing::{get, post},
};
use axum_tracing_opentelemetry::middleware::OtelAxumLayer;

use crate::{
    handlers::{create_user, delete_user, get_all_users, get_user, healthz, update_user},
    state::AppState,
};

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/user", post(create_user))
        .route("/users", get(get_all_users))
        .route(
            "/user/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/healthz", get(healthz))
        .layer(OtelAxumLayer::default())
        .with_state(state)
}
