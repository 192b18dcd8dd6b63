pub mod submission_router;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::config::CorsConfig;
use crate::handler::submission_handler::SubmissionState;
use submission_router::submission_router;

pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| {
            HeaderValue::from_str(origin)
                .map_err(|_| warn!("Skipping unusable CORS origin {}", origin))
                .ok()
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
}

/// The whole HTTP surface: forms, health, banner, CORS, tracing and the body limit.
pub fn app_router(service: SubmissionState, cors: &CorsConfig, body_limit: usize) -> Router {
    Router::new()
        .merge(submission_router(service))
        .route("/health", get(|| async { "OK" }))
        .route("/", get(|| async { "NoteEase backend is running!" }))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors_layer(cors))
        .layer(TraceLayer::new_for_http())
}
