//! In-memory store used by tests and local tooling.
//!
//! A `Mutex` over the whole map gives the same atomicity the Postgres store
//! gets from a transaction: the version check, the record swap and the audit
//! append all happen under one lock acquisition.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::common::RecordId;
use crate::domains::records::models::{AuditEntry, ContentRecord, RecordStatus};
use crate::domains::records::store::{RecordStore, StoreError};

#[derive(Default)]
pub struct InMemoryRecordStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    records: HashMap<RecordId, ContentRecord>,
    audit: HashMap<RecordId, Vec<AuditEntry>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn insert(&self, record: ContentRecord) -> Result<ContentRecord, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.audit.entry(record.id).or_default();
        inner.records.insert(record.id, record.clone());
        Ok(record)
    }

    async fn fetch(&self, id: RecordId) -> Result<ContentRecord, StoreError> {
        let inner = self.inner.lock().unwrap();
        inner.records.get(&id).cloned().ok_or(StoreError::NotFound)
    }

    async fn commit(
        &self,
        expected_version: i64,
        mut record: ContentRecord,
        entry: AuditEntry,
    ) -> Result<ContentRecord, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let stored = inner.records.get(&record.id).ok_or(StoreError::NotFound)?;
        if stored.version != expected_version {
            return Err(StoreError::Conflict);
        }
        record.version = expected_version + 1;
        record.updated_at = entry.at;
        inner.records.insert(record.id, record.clone());
        inner.audit.entry(record.id).or_default().push(entry);
        Ok(record)
    }

    async fn audit_trail(&self, id: RecordId) -> Result<Vec<AuditEntry>, StoreError> {
        let inner = self.inner.lock().unwrap();
        if !inner.records.contains_key(&id) {
            return Err(StoreError::NotFound);
        }
        Ok(inner.audit.get(&id).cloned().unwrap_or_default())
    }

    async fn list_by_status(&self, status: RecordStatus) -> Result<Vec<ContentRecord>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut records: Vec<ContentRecord> = inner
            .records
            .values()
            .filter(|r| r.status == status)
            .cloned()
            .collect();
        records.sort_by_key(|r| r.created_at);
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ActorId;
    use crate::domains::records::models::{AuditAction, Classification, RecordData};

    fn draft() -> ContentRecord {
        ContentRecord::new_draft(
            ActorId::new(),
            Classification::Museum,
            RecordData {
                name: "Soares dos Reis Museum".to_string(),
                location: "Porto".to_string(),
                ..Default::default()
            },
        )
    }

    fn entry(record: &ContentRecord) -> AuditEntry {
        AuditEntry::new(
            record.id,
            record.owner_id,
            AuditAction::Submit,
            RecordStatus::Draft,
            RecordStatus::PendingReview,
            None,
        )
    }

    #[tokio::test]
    async fn commit_bumps_version_and_appends_audit() {
        let store = InMemoryRecordStore::new();
        let record = store.insert(draft()).await.unwrap();

        let mut next = record.clone();
        next.status = RecordStatus::PendingReview;
        let committed = store.commit(0, next, entry(&record)).await.unwrap();

        assert_eq!(committed.version, 1);
        assert_eq!(committed.status, RecordStatus::PendingReview);
        assert_eq!(store.audit_trail(record.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn stale_version_conflicts_and_writes_nothing() {
        let store = InMemoryRecordStore::new();
        let record = store.insert(draft()).await.unwrap();

        let mut next = record.clone();
        next.status = RecordStatus::PendingReview;
        store.commit(0, next.clone(), entry(&record)).await.unwrap();

        // Second writer still holds version 0.
        let err = store.commit(0, next, entry(&record)).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict));
        assert_eq!(store.audit_trail(record.id).await.unwrap().len(), 1);
        assert_eq!(store.fetch(record.id).await.unwrap().version, 1);
    }

    #[tokio::test]
    async fn fetch_unknown_record_is_not_found() {
        let store = InMemoryRecordStore::new();
        let err = store.fetch(RecordId::new()).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }
}
