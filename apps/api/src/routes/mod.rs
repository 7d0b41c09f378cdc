pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::scores::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Thresholds API
        .route("/api/v1/thresholds/analyze", post(handlers::handle_analyze))
        .route("/api/v1/thresholds/parse", post(handlers::handle_parse))
        .route("/api/v1/thresholds/apply", post(handlers::handle_apply))
        .route(
            "/api/v1/thresholds/custom-prompt",
            post(handlers::handle_custom_prompt),
        )
        .route("/api/v1/thresholds/compute", post(handlers::handle_compute))
        .route(
            "/api/v1/thresholds/sample-prompts",
            post(handlers::handle_sample_prompts),
        )
        .with_state(state)
}
