//! Collaborator interfaces and their HTTP adapters.
//!
//! The generation core talks to three external services: the content
//! analyzer (scraper), the AI schema generator, and the schema validator.
//! Each is a trait with closed, typed error kinds so that the orchestrator
//! can classify failures without sniffing message text; the `Http*`
//! implementations here speak a neutral JSON shape to remote services.
//!
//! The AI backend is a constructor-injected strategy: callers build a
//! [`generator::GeneratorConfig`] naming the provider explicitly and pass
//! the resulting generator into the orchestrator. There is no process-wide
//! provider switch.

pub mod analyzer;
pub mod generator;
pub mod validator;

pub use analyzer::{AnalyzerError, ContentAnalyzer, HttpContentAnalyzer};
pub use generator::{
    GeneratorConfig, GeneratorError, HttpSchemaGenerator, ProviderKind, RefineOutcome,
    SchemaGenerator,
};
pub use validator::{
    ComplianceValidator, HttpSchemaValidator, ShapeValidator, ValidatorError,
};
