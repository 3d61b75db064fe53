pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::campaigns::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/campaigns/maybe-show",
            get(handlers::handle_maybe_show),
        )
        .route("/api/v1/campaigns/report", post(handlers::handle_report))
        .with_state(state)
}
