//! Route definitions for the markup generation surface.
//!
//! ```text
//! POST   /generate         markup::generate
//! POST   /batch-generate   markup::batch_generate
//! GET    /{id}             markup::get_markup
//! DELETE /{id}             markup::soft_delete
//! POST   /{id}/refine      markup::refine
//! POST   /{id}/rescore     markup::rescore
//! ```

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::markup;
use crate::state::AppState;

/// Routes nested under `/markup`.
pub fn markup_router() -> Router<AppState> {
    Router::new()
        .route("/generate", post(markup::generate))
        .route("/batch-generate", post(markup::batch_generate))
        .route("/{id}", get(markup::get_markup).delete(markup::soft_delete))
        .route("/{id}/refine", post(markup::refine))
        .route("/{id}/rescore", post(markup::rescore))
}
