//! Router assembly and HTTP middleware layers.

use std::time::Duration;

use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::routes;
use crate::state::AppState;

/// Build the full application router with middleware applied.
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .merge(routes::health::health_router())
        .merge(routes::credits::credits_router())
        .nest("/markup", routes::markup::markup_router());

    let timeout = Duration::from_secs(state.config.request_timeout_secs);
    let cors = build_cors_layer(&state.config.cors_origins);

    Router::new()
        .nest("/api/v1", api)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(TimeoutLayer::new(timeout))
        .layer(cors)
        .with_state(state)
}

/// CORS layer restricted to the configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([CONTENT_TYPE])
}
