//! Route definitions for credit balance reads.

use axum::routing::get;
use axum::Router;

use crate::handlers::credits;
use crate::state::AppState;

pub fn credits_router() -> Router<AppState> {
    Router::new().route("/accounts/{id}/credits", get(credits::get_balance))
}
