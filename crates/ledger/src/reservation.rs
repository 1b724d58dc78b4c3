//! Reservation token and refund audit types.

use schemagen_core::types::{AccountId, Credits, Timestamp};
use serde::Serialize;
use uuid::Uuid;

/// Proof of a held reservation, returned by `reserve` and consumed by
/// `commit`/`refund`. The token itself is inert; all state lives in the
/// ledger so that duplicate resolutions can be detected.
#[derive(Debug, Clone)]
pub struct ReservationToken {
    pub id: Uuid,
    pub account_id: AccountId,
    pub amount: Credits,
}

impl ReservationToken {
    pub fn new(account_id: impl Into<AccountId>, amount: Credits) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id: account_id.into(),
            amount,
        }
    }
}

/// One refund, kept for manual reconciliation and tests.
#[derive(Debug, Clone, Serialize)]
pub struct RefundEntry {
    pub reservation_id: Uuid,
    pub account_id: AccountId,
    pub amount: Credits,
    pub reason: String,
    pub refunded_at: Timestamp,
}
