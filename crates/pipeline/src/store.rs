//! Record persistence interface and in-memory reference implementation.
//!
//! Durable persistence is a collaborator of the core, so the store is a
//! trait. Each request owns exactly one record through its lifecycle; the
//! only contended write is the refinement read-modify-write, which is
//! guarded by an optimistic `expected_refinement_count` check so two
//! concurrent refinements cannot both pass the limit.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use schemagen_core::candidate::CandidateSchema;
use schemagen_core::content_type::ContentType;
use schemagen_core::scoring::SchemaScore;
use schemagen_core::types::RecordId;
use tokio::sync::RwLock;

use crate::record::GenerationRecord;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Record not found: {0}")]
    NotFound(RecordId),

    /// A conditional write lost its race (stale refinement count) or an
    /// id collision occurred.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Record store unavailable: {0}")]
    Unavailable(String),
}

// ---------------------------------------------------------------------------
// RecordStore
// ---------------------------------------------------------------------------

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn create(&self, record: GenerationRecord) -> Result<(), StoreError>;

    /// Replace the stored record with the same id.
    async fn update(&self, record: GenerationRecord) -> Result<(), StoreError>;

    async fn get(&self, id: RecordId) -> Result<GenerationRecord, StoreError>;

    /// The most recently created record for this account + url + final
    /// content type, deleted or not.
    async fn find_latest_for_url_type(
        &self,
        account_id: &str,
        url: &str,
        content_type: &ContentType,
    ) -> Result<Option<GenerationRecord>, StoreError>;

    /// Number of distinct content types with a live (non-deleted) record
    /// for this account + url.
    async fn count_types_for_url(&self, account_id: &str, url: &str) -> Result<usize, StoreError>;

    /// Whether any successful record exists for this account + url.
    /// Drives the "already paid for this URL" billing exemption.
    async fn has_successful_for_url(
        &self,
        account_id: &str,
        url: &str,
    ) -> Result<bool, StoreError>;

    /// Conditionally apply a refinement: succeeds only when the stored
    /// refinement count still equals `expected_refinement_count`, and
    /// writes candidates, score, and the incremented count together.
    async fn update_refinement(
        &self,
        id: RecordId,
        expected_refinement_count: u32,
        candidates: Vec<CandidateSchema>,
        score: SchemaScore,
    ) -> Result<GenerationRecord, StoreError>;
}

// ---------------------------------------------------------------------------
// InMemoryRecordStore
// ---------------------------------------------------------------------------

/// Reference [`RecordStore`] backed by process memory.
#[derive(Default)]
pub struct InMemoryRecordStore {
    records: RwLock<HashMap<RecordId, GenerationRecord>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn create(&self, record: GenerationRecord) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        if records.contains_key(&record.id) {
            return Err(StoreError::Conflict(format!(
                "record {} already exists",
                record.id
            )));
        }
        records.insert(record.id, record);
        Ok(())
    }

    async fn update(&self, record: GenerationRecord) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        if !records.contains_key(&record.id) {
            return Err(StoreError::NotFound(record.id));
        }
        records.insert(record.id, record);
        Ok(())
    }

    async fn get(&self, id: RecordId) -> Result<GenerationRecord, StoreError> {
        self.records
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn find_latest_for_url_type(
        &self,
        account_id: &str,
        url: &str,
        content_type: &ContentType,
    ) -> Result<Option<GenerationRecord>, StoreError> {
        let records = self.records.read().await;
        let latest = records
            .values()
            .filter(|r| r.account_id == account_id && r.url == url && &r.final_type == content_type)
            .max_by_key(|r| r.created_at)
            .cloned();
        Ok(latest)
    }

    async fn count_types_for_url(&self, account_id: &str, url: &str) -> Result<usize, StoreError> {
        let records = self.records.read().await;
        let types: HashSet<&str> = records
            .values()
            .filter(|r| r.account_id == account_id && r.url == url && !r.deleted)
            .map(|r| r.final_type.as_str())
            .collect();
        Ok(types.len())
    }

    async fn has_successful_for_url(
        &self,
        account_id: &str,
        url: &str,
    ) -> Result<bool, StoreError> {
        let records = self.records.read().await;
        Ok(records.values().any(|r| {
            r.account_id == account_id
                && r.url == url
                && r.status == crate::record::GenerationStatus::Success
        }))
    }

    async fn update_refinement(
        &self,
        id: RecordId,
        expected_refinement_count: u32,
        candidates: Vec<CandidateSchema>,
        score: SchemaScore,
    ) -> Result<GenerationRecord, StoreError> {
        let mut records = self.records.write().await;
        let record = records.get_mut(&id).ok_or(StoreError::NotFound(id))?;

        if record.refinement_count != expected_refinement_count {
            return Err(StoreError::Conflict(format!(
                "refinement count changed (expected {expected_refinement_count}, found {})",
                record.refinement_count
            )));
        }

        record.candidates = candidates;
        record.score = Some(score);
        record.refinement_count = expected_refinement_count + 1;
        record.updated_at = chrono::Utc::now();
        Ok(record.clone())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::GenerationStatus;
    use schemagen_core::candidate::CandidateSchema;
    use schemagen_core::scoring::score_candidate;

    fn record(url: &str, content_type: ContentType) -> GenerationRecord {
        GenerationRecord::new_pending("acct-1", url, content_type)
    }

    fn some_score() -> SchemaScore {
        score_candidate(&CandidateSchema::new(serde_json::json!({})), None)
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let store = InMemoryRecordStore::new();
        let r = record("https://example.com", ContentType::Article);
        let id = r.id;
        store.create(r).await.unwrap();
        let loaded = store.get(id).await.unwrap();
        assert_eq!(loaded.url, "https://example.com");
    }

    #[tokio::test]
    async fn get_missing_record_is_not_found() {
        let store = InMemoryRecordStore::new();
        assert!(matches!(
            store.get(uuid::Uuid::new_v4()).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn duplicate_create_conflicts() {
        let store = InMemoryRecordStore::new();
        let r = record("https://example.com", ContentType::Article);
        store.create(r.clone()).await.unwrap();
        assert!(matches!(
            store.create(r).await,
            Err(StoreError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn find_latest_matches_on_final_type() {
        let store = InMemoryRecordStore::new();
        store
            .create(record("https://example.com", ContentType::Article))
            .await
            .unwrap();

        let found = store
            .find_latest_for_url_type("acct-1", "https://example.com", &ContentType::Article)
            .await
            .unwrap();
        assert!(found.is_some());

        let missing = store
            .find_latest_for_url_type("acct-1", "https://example.com", &ContentType::FaqPage)
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn count_types_ignores_deleted_records() {
        let store = InMemoryRecordStore::new();
        store
            .create(record("https://example.com", ContentType::Article))
            .await
            .unwrap();

        let mut deleted = record("https://example.com", ContentType::FaqPage);
        deleted.deleted = true;
        store.create(deleted).await.unwrap();

        let count = store
            .count_types_for_url("acct-1", "https://example.com")
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn has_successful_for_url_requires_success_status() {
        let store = InMemoryRecordStore::new();
        let mut r = record("https://example.com", ContentType::Article);
        store.create(r.clone()).await.unwrap();
        assert!(!store
            .has_successful_for_url("acct-1", "https://example.com")
            .await
            .unwrap());

        r.status = GenerationStatus::Success;
        store.update(r).await.unwrap();
        assert!(store
            .has_successful_for_url("acct-1", "https://example.com")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn refinement_write_is_optimistic() {
        let store = InMemoryRecordStore::new();
        let r = record("https://example.com", ContentType::Article);
        let id = r.id;
        store.create(r).await.unwrap();

        let updated = store
            .update_refinement(id, 0, vec![], some_score())
            .await
            .unwrap();
        assert_eq!(updated.refinement_count, 1);

        // A second writer that read count 0 must lose.
        let stale = store.update_refinement(id, 0, vec![], some_score()).await;
        assert!(matches!(stale, Err(StoreError::Conflict(_))));

        assert_eq!(store.get(id).await.unwrap().refinement_count, 1);
    }
}
