//! Refinement limiter constants and checks.
//!
//! Refinements are covered by the original generation's credit, so the
//! limiter never touches the ledger; it only bounds how many improvement
//! passes one record may receive.

use crate::error::CoreError;

/// Maximum number of refinement passes per generation record.
pub const MAX_REFINEMENTS: u32 = 2;

/// True while the record has refinement passes left.
pub fn can_refine(refinement_count: u32) -> bool {
    refinement_count < MAX_REFINEMENTS
}

/// Validate that another refinement is allowed. Exceeding the limit is a
/// caller-facing error that names the limit.
pub fn ensure_refinable(refinement_count: u32) -> Result<(), CoreError> {
    if can_refine(refinement_count) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Refinement limit reached: a schema may be refined at most {MAX_REFINEMENTS} times"
        )))
    }
}
