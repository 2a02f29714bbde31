//! Persistence boundary for records and their audit trails.
//!
//! The engine talks to a `RecordStore` and nothing else. `commit` is the
//! transactional heart: record state and the matching audit entry land in
//! one atomic write, guarded by the record's version.

pub mod memory;
pub mod postgres;

pub use memory::InMemoryRecordStore;
pub use postgres::PgRecordStore;

use async_trait::async_trait;
use thiserror::Error;

use crate::common::RecordId;
use crate::domains::records::models::{AuditEntry, ContentRecord, RecordStatus};

/// Failures at the persistence boundary.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    /// The record's version no longer matches; a concurrent commit won.
    #[error("version conflict")]
    Conflict,

    #[error("backend error: {0}")]
    Backend(#[from] anyhow::Error),
}

/// Transactional document store for records plus their append-only audit
/// sub-collection. One record is the unit of contention; different records
/// are fully independent.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Persist a brand-new draft record.
    async fn insert(&self, record: ContentRecord) -> Result<ContentRecord, StoreError>;

    /// Fetch the current state of a record.
    async fn fetch(&self, id: RecordId) -> Result<ContentRecord, StoreError>;

    /// Atomically persist a new record state and append one audit entry.
    ///
    /// `expected_version` is the version the caller read; if the stored
    /// record has moved on, the commit fails with `Conflict` and nothing is
    /// written. On success the stored version is `expected_version + 1`.
    async fn commit(
        &self,
        expected_version: i64,
        record: ContentRecord,
        entry: AuditEntry,
    ) -> Result<ContentRecord, StoreError>;

    /// Time-ordered audit trail for a record. Returns an empty list for
    /// records that exist but have never transitioned.
    async fn audit_trail(&self, id: RecordId) -> Result<Vec<AuditEntry>, StoreError>;

    /// All records currently in `status`, oldest first.
    async fn list_by_status(&self, status: RecordStatus) -> Result<Vec<ContentRecord>, StoreError>;
}
