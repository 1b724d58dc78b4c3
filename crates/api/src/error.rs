use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use schemagen_pipeline::{PipelineError, StoreError};
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`PipelineError`] for pipeline outcomes and adds HTTP-specific
/// variants. Implements [`IntoResponse`] to produce consistent JSON error
/// responses carrying a stable machine-readable `code`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// An outcome from the generation pipeline.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// A record store error from read endpoints.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::Pipeline(pipeline) => pipeline_response(pipeline),

            AppError::Store(StoreError::NotFound(id)) => (
                StatusCode::NOT_FOUND,
                json!({
                    "error": format!("Markup {id} not found"),
                    "code": "NOT_FOUND",
                }),
            ),
            AppError::Store(err) => {
                tracing::error!(error = %err, "Record store error");
                internal_body()
            }

            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": msg, "code": "BAD_REQUEST" }),
            ),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal_body()
            }
        };

        (status, axum::Json(body)).into_response()
    }
}

/// Map a pipeline outcome to an HTTP status and body.
///
/// - insufficient credits is specific and immediate (402);
/// - a content mismatch is specific and carries alternative types (422);
/// - every other terminal failure is the generic message plus taxonomy
///   codes for support diagnostics.
fn pipeline_response(err: &PipelineError) -> (StatusCode, serde_json::Value) {
    match err {
        PipelineError::InvalidRequest(msg) => (
            StatusCode::BAD_REQUEST,
            json!({ "error": msg, "code": "VALIDATION_ERROR" }),
        ),
        PipelineError::InsufficientCredits(msg) => (
            StatusCode::PAYMENT_REQUIRED,
            json!({ "error": msg, "code": "INSUFFICIENT_CREDITS" }),
        ),
        PipelineError::Incompatible {
            reason,
            alternatives,
        } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            json!({
                "error": reason,
                "code": "CONTENT_MISMATCH",
                "suggested_types": alternatives
                    .iter()
                    .map(|t| t.as_str())
                    .collect::<Vec<_>>(),
            }),
        ),
        PipelineError::Conflict(msg) => (
            StatusCode::CONFLICT,
            json!({ "error": msg, "code": "CONFLICT" }),
        ),
        PipelineError::NotFound(id) => (
            StatusCode::NOT_FOUND,
            json!({
                "error": format!("Markup {id} not found"),
                "code": "NOT_FOUND",
            }),
        ),
        PipelineError::Generation { reason, stage, .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({
                "error": "Generation failed",
                "code": reason.as_str(),
                "stage": stage.as_str(),
            }),
        ),
        PipelineError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal pipeline error");
            let (status, body) = internal_body();
            (status, body)
        }
    }
}

fn internal_body() -> (StatusCode, serde_json::Value) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({
            "error": "An internal error occurred",
            "code": "INTERNAL_ERROR",
        }),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
