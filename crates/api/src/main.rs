use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use schemagen_api::config::ServerConfig;
use schemagen_api::{router, state::AppState};
use schemagen_events::catalog::{spawn_catalog_listener, InMemoryCatalogStore};
use schemagen_events::EventBus;
use schemagen_ledger::InMemoryCreditLedger;
use schemagen_pipeline::{InMemoryRecordStore, Orchestrator, OrchestratorConfig};
use schemagen_providers::{
    ComplianceValidator, HttpContentAnalyzer, HttpSchemaGenerator, HttpSchemaValidator,
    ShapeValidator,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "schemagen_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = Arc::new(ServerConfig::from_env());
    tracing::info!(host = %config.host, port = config.port, "Loaded server configuration");

    // --- Ledger ---
    let ledger = Arc::new(InMemoryCreditLedger::new());
    for (account, credits) in &config.seed_accounts {
        ledger.seed_account(account.clone(), *credits).await;
        tracing::info!(account = %account, credits, "Seeded credit balance");
    }

    // --- Record store ---
    let store = Arc::new(InMemoryRecordStore::new());

    // --- Event bus + catalog listener ---
    let event_bus = Arc::new(EventBus::default());
    let shutdown = CancellationToken::new();
    let catalog_store = Arc::new(InMemoryCatalogStore::new());
    let catalog_handle = spawn_catalog_listener(&event_bus, catalog_store, shutdown.clone());

    // --- Collaborators ---
    let analyzer = Arc::new(HttpContentAnalyzer::new(
        config.analyzer_url.clone(),
        &config.analyzer_user_agent,
    ));
    let generator = Arc::new(HttpSchemaGenerator::new(config.generator.clone()));
    tracing::info!(
        provider = config.generator.kind.as_str(),
        model = %config.generator.model,
        "AI generation backend selected",
    );

    let validator = Arc::new(HttpSchemaValidator::new(config.validator_url.clone()));
    let shape_validator: Arc<dyn ShapeValidator> = validator.clone();
    let compliance_validator: Arc<dyn ComplianceValidator> = validator;

    // --- Orchestrator ---
    let orchestrator = Arc::new(Orchestrator::new(
        analyzer,
        generator,
        shape_validator,
        Some(compliance_validator),
        ledger.clone(),
        store.clone(),
        event_bus.clone(),
        OrchestratorConfig {
            analyze_timeout: Duration::from_secs(config.analyze_timeout_secs),
            ..Default::default()
        },
    ));

    // --- Router ---
    let app = router::build_router(AppState {
        orchestrator,
        ledger,
        store,
        event_bus,
        config: config.clone(),
    });

    // --- Serve ---
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Stop background listeners after the server drains.
    shutdown.cancel();
    let _ = catalog_handle.await;
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("Shutdown signal received");
}
