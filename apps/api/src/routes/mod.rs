pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::feedback::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/analyze", post(handlers::handle_analyze))
        .route("/analyses", get(handlers::handle_list_analyses))
        .route(
            "/analysis/:id",
            get(handlers::handle_get_analysis).delete(handlers::handle_delete_analysis),
        )
        .with_state(state)
}
