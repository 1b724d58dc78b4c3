//! In-process ledger implementation.
//!
//! All balances, reservation states, and the refund audit log live behind
//! one `tokio::sync::Mutex`, so every reserve is a single conditional
//! decrement under one lock acquisition, never a read-then-write pair.

use std::collections::HashMap;

use async_trait::async_trait;
use schemagen_core::types::{AccountId, Credits};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::reservation::{RefundEntry, ReservationToken};
use crate::{CreditLedger, LedgerError};

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Lifecycle of an issued reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReservationState {
    Held,
    Committed,
    Refunded,
}

#[derive(Default)]
struct LedgerState {
    balances: HashMap<AccountId, Credits>,
    reservations: HashMap<Uuid, ReservationState>,
    refunds: Vec<RefundEntry>,
}

// ---------------------------------------------------------------------------
// InMemoryCreditLedger
// ---------------------------------------------------------------------------

/// Reference [`CreditLedger`] backed by process memory.
#[derive(Default)]
pub struct InMemoryCreditLedger {
    inner: Mutex<LedgerState>,
}

impl InMemoryCreditLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an account's balance, creating the account if needed.
    pub async fn seed_account(&self, account_id: impl Into<AccountId>, balance: Credits) {
        let mut state = self.inner.lock().await;
        state.balances.insert(account_id.into(), balance);
    }

    /// Snapshot of the refund audit log, oldest first.
    pub async fn refund_audit(&self) -> Vec<RefundEntry> {
        self.inner.lock().await.refunds.clone()
    }
}

#[async_trait]
impl CreditLedger for InMemoryCreditLedger {
    async fn reserve(
        &self,
        account_id: &str,
        amount: Credits,
    ) -> Result<ReservationToken, LedgerError> {
        let mut state = self.inner.lock().await;

        let balance = state
            .balances
            .get_mut(account_id)
            .ok_or_else(|| LedgerError::UnknownAccount(account_id.to_string()))?;

        if *balance < amount {
            return Err(LedgerError::InsufficientFunds {
                account_id: account_id.to_string(),
                available: *balance,
                requested: amount,
            });
        }

        *balance -= amount;
        let token = ReservationToken::new(account_id, amount);
        state.reservations.insert(token.id, ReservationState::Held);

        tracing::debug!(
            account_id,
            amount,
            reservation_id = %token.id,
            "Credits reserved",
        );
        Ok(token)
    }

    async fn commit(&self, token: &ReservationToken) -> Result<(), LedgerError> {
        let mut state = self.inner.lock().await;

        let entry = state
            .reservations
            .get_mut(&token.id)
            .ok_or(LedgerError::UnknownReservation(token.id))?;

        match *entry {
            ReservationState::Held => {
                *entry = ReservationState::Committed;
                tracing::debug!(reservation_id = %token.id, "Reservation committed");
                Ok(())
            }
            ReservationState::Committed => Ok(()),
            ReservationState::Refunded => Err(LedgerError::InvalidState(format!(
                "reservation {} was already refunded",
                token.id
            ))),
        }
    }

    async fn refund(&self, token: &ReservationToken, reason: &str) -> Result<(), LedgerError> {
        let mut state = self.inner.lock().await;

        let current = *state
            .reservations
            .get(&token.id)
            .ok_or(LedgerError::UnknownReservation(token.id))?;

        match current {
            ReservationState::Held => {
                state
                    .reservations
                    .insert(token.id, ReservationState::Refunded);
                *state.balances.entry(token.account_id.clone()).or_insert(0) += token.amount;
                state.refunds.push(RefundEntry {
                    reservation_id: token.id,
                    account_id: token.account_id.clone(),
                    amount: token.amount,
                    reason: reason.to_string(),
                    refunded_at: chrono::Utc::now(),
                });
                tracing::debug!(
                    reservation_id = %token.id,
                    account_id = %token.account_id,
                    reason,
                    "Reservation refunded",
                );
                Ok(())
            }
            // Idempotent: a second refund is a no-op.
            ReservationState::Refunded => Ok(()),
            ReservationState::Committed => Err(LedgerError::InvalidState(format!(
                "reservation {} was already committed",
                token.id
            ))),
        }
    }

    async fn balance(&self, account_id: &str) -> Result<Credits, LedgerError> {
        let state = self.inner.lock().await;
        state
            .balances
            .get(account_id)
            .copied()
            .ok_or_else(|| LedgerError::UnknownAccount(account_id.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
