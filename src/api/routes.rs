use axum::{
    routing::get,
    Router,
};
use tower_http::cors::CorsLayer;
use super::handlers::{get_tokens, health};
use super::state::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/tokens", get(get_tokens))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
