//! Fire-and-forget markup catalog bookkeeping.
//!
//! The orchestrator used to write catalog rows inline and swallow their
//! failures; here the bookkeeping is a detached listener on the event bus.
//! It records one [`CatalogEntry`] per `generation.succeeded` event and
//! logs (never propagates) its own failures.

use std::sync::Arc;

use async_trait::async_trait;
use schemagen_core::types::{AccountId, RecordId, Timestamp};
use serde::Serialize;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::bus::EventBus;
use crate::EVENT_GENERATION_SUCCEEDED;

// ---------------------------------------------------------------------------
// CatalogEntry / CatalogStore
// ---------------------------------------------------------------------------

/// One successfully generated markup, as listed in the account's library.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogEntry {
    pub record_id: RecordId,
    pub account_id: AccountId,
    pub url: String,
    pub content_type: String,
    pub score: Option<u8>,
    pub recorded_at: Timestamp,
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Catalog store unavailable: {0}")]
    Unavailable(String),
}

/// Destination for catalog entries. Durable implementations live outside
/// the core; the in-memory store backs tests and single-node deployments.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn record(&self, entry: CatalogEntry) -> Result<(), CatalogError>;
}

/// Reference [`CatalogStore`] backed by process memory.
#[derive(Default)]
pub struct InMemoryCatalogStore {
    entries: Mutex<Vec<CatalogEntry>>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn entries(&self) -> Vec<CatalogEntry> {
        self.entries.lock().await.clone()
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn record(&self, entry: CatalogEntry) -> Result<(), CatalogError> {
        self.entries.lock().await.push(entry);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Listener
// ---------------------------------------------------------------------------

/// Spawn the catalog listener. Runs until `cancel` is triggered.
///
/// Each `generation.succeeded` event becomes one catalog entry. Store
/// failures and malformed payloads are logged and skipped; catalog
/// bookkeeping must never affect a generation outcome.
pub fn spawn_catalog_listener(
    bus: &EventBus,
    store: Arc<dyn CatalogStore>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    let mut rx = bus.subscribe();

    tokio::spawn(async move {
        tracing::info!("Catalog listener started");
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Catalog listener shutting down");
                    break;
                }
                received = rx.recv() => {
                    match received {
                        Ok(event) if event.event_type == EVENT_GENERATION_SUCCEEDED => {
                            handle_success(&*store, event).await;
                        }
                        Ok(_) => {}
                        Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "Catalog listener lagged behind the bus");
                        }
                        Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                    }
                }
            }
        }
    })
}

async fn handle_success(store: &dyn CatalogStore, event: crate::PlatformEvent) {
    let (Some(record_id), Some(account_id)) = (event.record_id, event.account_id.clone()) else {
        tracing::warn!(event_type = %event.event_type, "Success event without record/account");
        return;
    };

    let entry = CatalogEntry {
        record_id,
        account_id,
        url: event.payload["url"].as_str().unwrap_or_default().to_string(),
        content_type: event.payload["content_type"]
            .as_str()
            .unwrap_or_default()
            .to_string(),
        score: event.payload["score"].as_u64().map(|s| s.min(100) as u8),
        recorded_at: event.timestamp,
    };

    if let Err(e) = store.record(entry).await {
        tracing::warn!(record_id = %record_id, error = %e, "Failed to record catalog entry");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PlatformEvent;
    use std::time::Duration;

    async fn wait_for_entries(store: &InMemoryCatalogStore, n: usize) -> Vec<CatalogEntry> {
        for _ in 0..50 {
            let entries = store.entries().await;
            if entries.len() >= n {
                return entries;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        store.entries().await
    }

    #[tokio::test]
    async fn success_events_become_catalog_entries() {
        let bus = EventBus::default();
        let store = Arc::new(InMemoryCatalogStore::new());
        let cancel = CancellationToken::new();
        let handle = spawn_catalog_listener(&bus, store.clone(), cancel.clone());

        let record_id = uuid::Uuid::new_v4();
        bus.publish(
            PlatformEvent::new(EVENT_GENERATION_SUCCEEDED)
                .with_record(record_id)
                .with_account("acct-1")
                .with_payload(serde_json::json!({
                    "url": "https://example.com",
                    "content_type": "Article",
                    "score": 88,
                })),
        );

        let entries = wait_for_entries(&store, 1).await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].record_id, record_id);
        assert_eq!(entries[0].content_type, "Article");
        assert_eq!(entries[0].score, Some(88));

        cancel.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn non_success_events_are_ignored() {
        let bus = EventBus::default();
        let store = Arc::new(InMemoryCatalogStore::new());
        let cancel = CancellationToken::new();
        let handle = spawn_catalog_listener(&bus, store.clone(), cancel.clone());

        bus.publish(PlatformEvent::new(crate::EVENT_GENERATION_FAILED).with_account("acct-1"));

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(store.entries().await.is_empty());

        cancel.cancel();
        handle.await.unwrap();
    }
}
