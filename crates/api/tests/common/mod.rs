//! Shared state construction for router tests.
//!
//! Collaborator clients point at unroutable localhost ports; tests here
//! only exercise routing, extraction, and error mapping, never a live
//! generation.

use std::sync::Arc;
use std::time::Duration;

use schemagen_api::config::ServerConfig;
use schemagen_api::state::AppState;
use schemagen_events::EventBus;
use schemagen_ledger::InMemoryCreditLedger;
use schemagen_pipeline::{InMemoryRecordStore, Orchestrator, OrchestratorConfig};
use schemagen_providers::{
    GeneratorConfig, HttpContentAnalyzer, HttpSchemaGenerator, HttpSchemaValidator, ProviderKind,
    ShapeValidator,
};

pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 5,
        analyzer_url: "http://127.0.0.1:1".to_string(),
        analyzer_user_agent: "schemagen-test".to_string(),
        analyze_timeout_secs: 1,
        validator_url: "http://127.0.0.1:1".to_string(),
        generator: GeneratorConfig {
            kind: ProviderKind::OpenAi,
            base_url: "http://127.0.0.1:1".to_string(),
            api_key: String::new(),
            model: "test-model".to_string(),
            timeout: Duration::from_secs(1),
        },
        exempt_accounts: vec![],
        seed_accounts: vec![],
    }
}

pub fn test_state() -> AppState {
    let config = Arc::new(test_config());
    let ledger = Arc::new(InMemoryCreditLedger::new());
    let store = Arc::new(InMemoryRecordStore::new());
    let event_bus = Arc::new(EventBus::default());

    let analyzer = Arc::new(HttpContentAnalyzer::new(
        config.analyzer_url.clone(),
        &config.analyzer_user_agent,
    ));
    let generator = Arc::new(HttpSchemaGenerator::new(config.generator.clone()));
    let validator = Arc::new(HttpSchemaValidator::new(config.validator_url.clone()));
    let shape_validator: Arc<dyn ShapeValidator> = validator;

    let orchestrator = Arc::new(Orchestrator::new(
        analyzer,
        generator,
        shape_validator,
        None,
        ledger.clone(),
        store.clone(),
        event_bus.clone(),
        OrchestratorConfig::default(),
    ));

    AppState {
        orchestrator,
        ledger,
        store,
        event_bus,
        config,
    }
}
