//! The generation pipeline: record model, record store, and the
//! orchestrator that sequences analysis, the compatibility gate, credit
//! reservation, AI generation, validation, and scoring, with the
//! reserve-then-commit-or-refund protocol guaranteed on every path.

pub mod batch;
pub mod error;
pub mod orchestrator;
pub mod record;
pub mod refine;
pub mod store;

pub use batch::{BatchError, BatchSuccess, BatchSummary};
pub use error::PipelineError;
pub use orchestrator::{GenerationOutcome, GenerationRequest, Orchestrator, OrchestratorConfig};
pub use record::{GenerationRecord, GenerationStatus};
pub use refine::RefinementOutcome;
pub use store::{InMemoryRecordStore, RecordStore, StoreError};
