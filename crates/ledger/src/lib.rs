//! The credit reservation ledger.
//!
//! Guarantees exactly-once billing for work that may fail partway through:
//! [`CreditLedger::reserve`] tentatively removes credits from an account
//! balance with a single atomic conditional decrement, and each issued
//! token is later resolved by exactly one of [`CreditLedger::commit`] or
//! [`CreditLedger::refund`]. Both resolutions are idempotent so retries
//! on crash/error paths cannot double-spend or double-credit.
//!
//! [`InMemoryCreditLedger`] is the in-process reference implementation;
//! production deployments plug a durable backend in behind the same trait.

pub mod memory;
pub mod reservation;

use async_trait::async_trait;
use schemagen_core::types::Credits;
use uuid::Uuid;

pub use memory::InMemoryCreditLedger;
pub use reservation::{RefundEntry, ReservationToken};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Insufficient credits for account {account_id}: {available} available, {requested} requested")]
    InsufficientFunds {
        account_id: String,
        available: Credits,
        requested: Credits,
    },

    #[error("Unknown account: {0}")]
    UnknownAccount(String),

    #[error("Unknown reservation: {0}")]
    UnknownReservation(Uuid),

    /// A commit/refund that contradicts the token's already-applied fate.
    #[error("Invalid reservation state: {0}")]
    InvalidState(String),

    /// The backing store is unavailable. Callers log and flag for manual
    /// reconciliation rather than masking the original failure.
    #[error("Ledger unavailable: {0}")]
    Unavailable(String),
}

// ---------------------------------------------------------------------------
// CreditLedger
// ---------------------------------------------------------------------------

/// Atomic reserve/commit/refund over per-account integer balances.
#[async_trait]
pub trait CreditLedger: Send + Sync {
    /// Tentatively deduct `amount` from the account balance.
    ///
    /// Must be atomic with respect to concurrent reserves: two concurrent
    /// calls against a balance of 1 must not both succeed.
    async fn reserve(
        &self,
        account_id: &str,
        amount: Credits,
    ) -> Result<ReservationToken, LedgerError>;

    /// Make the deduction permanent. No-op if already committed.
    async fn commit(&self, token: &ReservationToken) -> Result<(), LedgerError>;

    /// Restore the reserved amount and record the reason for audit.
    /// Idempotent: refunding twice credits the balance exactly once.
    async fn refund(&self, token: &ReservationToken, reason: &str) -> Result<(), LedgerError>;

    /// Current balance for an account.
    async fn balance(&self, account_id: &str) -> Result<Credits, LedgerError>;
}
