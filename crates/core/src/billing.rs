//! Billing policy values and limits.
//!
//! The policy is an explicit value resolved by the caller (from account
//! configuration) and passed into the orchestrator per request, never
//! inferred from the deployment environment.

use serde::{Deserialize, Serialize};

use crate::types::Credits;

/// Whether a request is billed against the account's credit balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingPolicy {
    /// Normal metered billing: one credit reserved per generation.
    Metered,
    /// Trial/development accounts: no reservation is ever made.
    Exempt,
}

impl BillingPolicy {
    pub fn is_exempt(&self) -> bool {
        matches!(self, BillingPolicy::Exempt)
    }
}

/// Credits reserved for one generation.
pub const GENERATION_CREDIT_COST: Credits = 1;

/// Hard cap on distinct content-types generated for a single URL.
pub const MAX_CONTENT_TYPES_PER_URL: usize = 10;

/// Soft-deleting a record permits exactly this many regenerations.
pub const MAX_DELETIONS_PER_RECORD: u32 = 1;
