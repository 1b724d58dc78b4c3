//! Credit balance read endpoint.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use schemagen_ledger::LedgerError;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CreditBalanceResponse {
    pub account_id: String,
    pub balance: i64,
}

/// GET /api/v1/accounts/{id}/credits
pub async fn get_balance(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let balance = state
        .ledger
        .balance(&account_id)
        .await
        .map_err(|e| match e {
            LedgerError::UnknownAccount(account) => {
                AppError::BadRequest(format!("unknown account: {account}"))
            }
            other => AppError::InternalError(other.to_string()),
        })?;

    Ok(Json(DataResponse {
        data: CreditBalanceResponse {
            account_id,
            balance,
        },
    }))
}
