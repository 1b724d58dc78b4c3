//! Handlers for the markup generation surface.
//!
//! Routes:
//! - `POST   /markup/generate`         run one generation
//! - `POST   /markup/batch-generate`   run several URLs sequentially
//! - `GET    /markup/{id}`             fetch a generation record
//! - `DELETE /markup/{id}`             soft-delete (frees one regeneration)
//! - `POST   /markup/{id}/refine`      bounded refinement pass
//! - `POST   /markup/{id}/rescore`     re-score hand-edited candidates

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use schemagen_core::candidate::CandidateSchema;
use schemagen_core::content_type::ContentType;
use schemagen_core::scoring::SchemaScore;
use schemagen_core::types::RecordId;
use schemagen_pipeline::{BatchSummary, GenerationRecord, GenerationRequest};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Upper bound on URLs per batch request.
const MAX_BATCH_SIZE: usize = 25;

// ---------------------------------------------------------------------------
// Request DTOs
// ---------------------------------------------------------------------------

/// Body for `POST /markup/generate`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GenerateMarkupRequest {
    #[validate(url(message = "url must be a valid absolute URL"))]
    pub url: String,
    /// Requested content type; defaults to automatic detection.
    #[serde(default = "default_content_type")]
    pub content_type: String,
    #[validate(length(min = 1, message = "account_id is required"))]
    pub account_id: String,
    /// Opaque pass-through to the AI generator.
    pub options: Option<Value>,
}

fn default_content_type() -> String {
    "Auto".to_string()
}

/// Body for `POST /markup/batch-generate`.
#[derive(Debug, Deserialize)]
pub struct BatchGenerateRequest {
    pub requests: Vec<GenerateMarkupRequest>,
}

/// Body for `POST /markup/{id}/refine`.
#[derive(Debug, Deserialize)]
pub struct RefineMarkupRequest {
    #[serde(default)]
    pub options: Value,
}

/// Body for `POST /markup/{id}/rescore`.
#[derive(Debug, Deserialize)]
pub struct RescoreMarkupRequest {
    pub candidates: Vec<CandidateSchema>,
}

// ---------------------------------------------------------------------------
// Response DTOs
// ---------------------------------------------------------------------------

/// Response for `POST /markup/generate`.
#[derive(Debug, Serialize)]
pub struct GenerateMarkupResponse {
    #[serde(flatten)]
    pub record: GenerationRecord,
    pub charged: bool,
}

/// Response for `POST /markup/{id}/refine`.
#[derive(Debug, Serialize)]
pub struct RefineMarkupResponse {
    #[serde(flatten)]
    pub record: GenerationRecord,
    pub change_summary: Vec<String>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/markup/generate
pub async fn generate(
    State(state): State<AppState>,
    Json(input): Json<GenerateMarkupRequest>,
) -> AppResult<impl IntoResponse> {
    input
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let request = to_generation_request(&state, input);
    let outcome = state.orchestrator.generate(request).await?;

    Ok(Json(DataResponse {
        data: GenerateMarkupResponse {
            record: outcome.record,
            charged: outcome.charged,
        },
    }))
}

/// POST /api/v1/markup/batch-generate
pub async fn batch_generate(
    State(state): State<AppState>,
    Json(input): Json<BatchGenerateRequest>,
) -> AppResult<Json<DataResponse<BatchSummary>>> {
    if input.requests.is_empty() {
        return Err(AppError::BadRequest("requests must not be empty".to_string()));
    }
    if input.requests.len() > MAX_BATCH_SIZE {
        return Err(AppError::BadRequest(format!(
            "a batch is limited to {MAX_BATCH_SIZE} URLs"
        )));
    }
    for request in &input.requests {
        request
            .validate()
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
    }

    let requests = input
        .requests
        .into_iter()
        .map(|r| to_generation_request(&state, r))
        .collect();
    let summary = state.orchestrator.generate_batch(requests).await;

    Ok(Json(DataResponse { data: summary }))
}

/// GET /api/v1/markup/{id}
pub async fn get_markup(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> AppResult<impl IntoResponse> {
    let record = state.store.get(id).await?;
    Ok(Json(DataResponse { data: record }))
}

/// DELETE /api/v1/markup/{id}
pub async fn soft_delete(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> AppResult<impl IntoResponse> {
    let record = state.orchestrator.soft_delete(id).await?;
    Ok(Json(DataResponse { data: record }))
}

/// POST /api/v1/markup/{id}/refine
pub async fn refine(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
    Json(input): Json<RefineMarkupRequest>,
) -> AppResult<impl IntoResponse> {
    let outcome = state.orchestrator.refine(id, &input.options).await?;
    Ok(Json(DataResponse {
        data: RefineMarkupResponse {
            record: outcome.record,
            change_summary: outcome.change_summary,
        },
    }))
}

/// POST /api/v1/markup/{id}/rescore
pub async fn rescore(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
    Json(input): Json<RescoreMarkupRequest>,
) -> AppResult<Json<DataResponse<SchemaScore>>> {
    let score = state
        .orchestrator
        .recalculate_score(id, input.candidates)
        .await?;
    Ok(Json(DataResponse { data: score }))
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Build a pipeline request, resolving the billing policy from explicit
/// account configuration.
fn to_generation_request(state: &AppState, input: GenerateMarkupRequest) -> GenerationRequest {
    GenerationRequest {
        billing: state.config.billing_policy_for(&input.account_id),
        requested_type: ContentType::parse(&input.content_type),
        url: input.url,
        account_id: input.account_id,
        options: input
            .options
            .unwrap_or_else(|| Value::Object(Default::default())),
    }
}
