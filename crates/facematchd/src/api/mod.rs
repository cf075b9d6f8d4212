//! HTTP JSON API (Axum).

pub mod error;
pub mod handler;
pub mod payload;
pub mod state;


use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use error::ApiError;
pub use handler::{compare_faces_handler, extract_embedding_handler, health_handler};
pub use state::AppState;

pub fn create_router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/extract-embedding", post(extract_embedding_handler))
        .route("/compare-faces", post(compare_faces_handler))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
