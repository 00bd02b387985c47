use axum::{Router, middleware, routing::post};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::access_log;
use crate::upstream::UpstreamClient;

pub mod handlers;
pub mod models;

/// Immutable per-process state shared by every request.
pub struct AppState {
    pub upstream: UpstreamClient,
    pub url_prefix: String,
}

pub fn create_router(state: Arc<AppState>) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/SearchImageByURL",
            post(handlers::search_handler).fallback(handlers::wrong_method),
        )
        .fallback(handlers::unknown_route)
        .with_state(state)
        .layer(cors)
        .layer(middleware::from_fn(access_log::access_log))
}
