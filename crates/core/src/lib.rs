//! Pure domain logic for the markup generation core.
//!
//! Everything in this crate is side-effect-free: content-type taxonomy,
//! the compatibility gate, the quality scoring engine, the refinement
//! limiter, billing policy values, and the failure taxonomy. I/O-bound
//! concerns (ledger, collaborators, record store, HTTP) live in the
//! sibling crates and depend on this one.

pub mod billing;
pub mod candidate;
pub mod compatibility;
pub mod content_type;
pub mod error;
pub mod fact_sheet;
pub mod failure;
pub mod refinement;
pub mod scoring;
pub mod types;
