pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::chat::handlers::{handle_chat, CHAT_BODY_LIMIT};
use crate::illustration::handlers::handle_generate_illustration;
use crate::notes::handlers::handle_extract_points;
use crate::persona::handlers::handle_generate_persona;
use crate::state::AppState;
use crate::transform::handlers::handle_transform;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/chat",
            post(handle_chat).layer(DefaultBodyLimit::max(CHAT_BODY_LIMIT)),
        )
        .route("/api/transform", post(handle_transform))
        .route("/api/extract-points", post(handle_extract_points))
        .route("/api/generate-persona", post(handle_generate_persona))
        .route(
            "/api/generate-anime-image",
            post(handle_generate_illustration),
        )
        .with_state(state)
}
