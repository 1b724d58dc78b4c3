//! Platform events for the generation core.
//!
//! The orchestrator publishes outcomes here so that ancillary bookkeeping
//! (the markup catalog, billing reconciliation flags) stays structurally
//! decoupled from the generation result: a listener failure can never
//! change what the caller sees.

pub mod bus;
pub mod catalog;

pub use bus::{EventBus, PlatformEvent};

/// A generation completed successfully and was persisted.
pub const EVENT_GENERATION_SUCCEEDED: &str = "generation.succeeded";
/// A generation reached a terminal failure state.
pub const EVENT_GENERATION_FAILED: &str = "generation.failed";
/// A refund could not be applied; manual reconciliation is required.
pub const EVENT_BILLING_RECONCILIATION_REQUIRED: &str = "billing.reconciliation_required";
