//! Caller-facing pipeline errors.
//!
//! Terminal generation failures carry exactly one taxonomy reason and one
//! stage; raw collaborator diagnostics stay in the log, never in the
//! error shown to the caller.

use schemagen_core::content_type::ContentType;
use schemagen_core::failure::{FailureReason, FailureStage};
use schemagen_core::types::RecordId;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The request itself is malformed (bad URL, empty candidates, over a
    /// limit that names itself in the message).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Reservation failed before any paid work.
    #[error("Insufficient credits: {0}")]
    InsufficientCredits(String),

    /// The compatibility gate rejected the type/content pairing. Not a
    /// generation failure; carries alternatives for a retry.
    #[error("Content mismatch: {reason}")]
    Incompatible {
        reason: String,
        alternatives: Vec<ContentType>,
    },

    /// Duplicate url+type, regeneration cap, or a lost optimistic write.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Record not found: {0}")]
    NotFound(RecordId),

    /// A terminal pipeline failure. Credits (if reserved) were refunded.
    #[error("Generation failed: {} at {}", reason.as_str(), stage.as_str())]
    Generation {
        reason: FailureReason,
        stage: FailureStage,
        message: String,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}
