use std::sync::Arc;

use schemagen_events::EventBus;
use schemagen_ledger::CreditLedger;
use schemagen_pipeline::{Orchestrator, RecordStore};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// The generation pipeline.
    pub orchestrator: Arc<Orchestrator>,
    /// Credit ledger, for the balance endpoint.
    pub ledger: Arc<dyn CreditLedger>,
    /// Record store, for read endpoints.
    pub store: Arc<dyn RecordStore>,
    /// Centralized event bus.
    pub event_bus: Arc<EventBus>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}
