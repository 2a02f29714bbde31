//! Postgres-backed record store.
//!
//! Schema lives in `migrations/`. Record snapshots and staged change-sets
//! are stored as JSONB; statuses and classifications as their string forms.

use std::str::FromStr;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;

use crate::common::{ActorId, AuditEntryId, RecordId};
use crate::domains::records::models::{
    AuditAction, AuditEntry, ChangeSet, Classification, ContentRecord, RecordData, RecordStatus,
};
use crate::domains::records::store::{RecordStore, StoreError};

pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn insert(&self, record: ContentRecord) -> Result<ContentRecord, StoreError> {
        let row = sqlx::query_as::<_, RecordRow>(
            r#"
            INSERT INTO records (
                id, owner_id, classification, status, visible_data,
                pending_change, review_notes, unpublish_reason, retracted_by,
                retracted_at, version, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(record.id)
        .bind(record.owner_id)
        .bind(record.classification.to_string())
        .bind(record.status.to_string())
        .bind(Json(&record.visible_data))
        .bind(record.pending_change.as_ref().map(Json))
        .bind(&record.review_notes)
        .bind(&record.unpublish_reason)
        .bind(record.retracted_by)
        .bind(record.retracted_at)
        .bind(record.version)
        .bind(record.created_at)
        .bind(record.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(into_backend)?;
        row.try_into().map_err(StoreError::Backend)
    }

    async fn fetch(&self, id: RecordId) -> Result<ContentRecord, StoreError> {
        let row = sqlx::query_as::<_, RecordRow>("SELECT * FROM records WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(into_backend)?
            .ok_or(StoreError::NotFound)?;
        row.try_into().map_err(StoreError::Backend)
    }

    async fn commit(
        &self,
        expected_version: i64,
        record: ContentRecord,
        entry: AuditEntry,
    ) -> Result<ContentRecord, StoreError> {
        let mut tx = self.pool.begin().await.map_err(into_backend)?;

        let updated = sqlx::query_as::<_, RecordRow>(
            r#"
            UPDATE records
            SET status = $3,
                visible_data = $4,
                pending_change = $5,
                review_notes = $6,
                unpublish_reason = $7,
                retracted_by = $8,
                retracted_at = $9,
                version = version + 1,
                updated_at = $10
            WHERE id = $1 AND version = $2
            RETURNING *
            "#,
        )
        .bind(record.id)
        .bind(expected_version)
        .bind(record.status.to_string())
        .bind(Json(&record.visible_data))
        .bind(record.pending_change.as_ref().map(Json))
        .bind(&record.review_notes)
        .bind(&record.unpublish_reason)
        .bind(record.retracted_by)
        .bind(record.retracted_at)
        .bind(entry.at)
        .fetch_optional(&mut *tx)
        .await
        .map_err(into_backend)?;

        let Some(row) = updated else {
            // Distinguish a missing record from a lost version race.
            let exists: Option<i64> =
                sqlx::query_scalar("SELECT version FROM records WHERE id = $1")
                    .bind(record.id)
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(into_backend)?;
            return Err(match exists {
                Some(_) => StoreError::Conflict,
                None => StoreError::NotFound,
            });
        };

        sqlx::query(
            r#"
            INSERT INTO record_audit (
                id, record_id, actor, action, from_status, to_status, at, notes
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(entry.id)
        .bind(entry.record_id)
        .bind(entry.actor)
        .bind(entry.action.to_string())
        .bind(entry.from_status.to_string())
        .bind(entry.to_status.to_string())
        .bind(entry.at)
        .bind(&entry.notes)
        .execute(&mut *tx)
        .await
        .map_err(into_backend)?;

        tx.commit().await.map_err(into_backend)?;
        row.try_into().map_err(StoreError::Backend)
    }

    async fn audit_trail(&self, id: RecordId) -> Result<Vec<AuditEntry>, StoreError> {
        let exists: Option<i64> = sqlx::query_scalar("SELECT version FROM records WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(into_backend)?;
        if exists.is_none() {
            return Err(StoreError::NotFound);
        }

        let rows = sqlx::query_as::<_, AuditRow>(
            "SELECT * FROM record_audit WHERE record_id = $1 ORDER BY at, id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(into_backend)?;
        rows.into_iter()
            .map(|row| row.try_into().map_err(StoreError::Backend))
            .collect()
    }

    async fn list_by_status(&self, status: RecordStatus) -> Result<Vec<ContentRecord>, StoreError> {
        let rows = sqlx::query_as::<_, RecordRow>(
            "SELECT * FROM records WHERE status = $1 ORDER BY created_at",
        )
        .bind(status.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(into_backend)?;
        rows.into_iter()
            .map(|row| row.try_into().map_err(StoreError::Backend))
            .collect()
    }
}

fn into_backend(err: sqlx::Error) -> StoreError {
    StoreError::Backend(anyhow::Error::from(err))
}

// =============================================================================
// Row mapping
// =============================================================================

#[derive(sqlx::FromRow)]
struct RecordRow {
    id: RecordId,
    owner_id: ActorId,
    classification: String,
    status: String,
    visible_data: Json<RecordData>,
    pending_change: Option<Json<ChangeSet>>,
    review_notes: Option<String>,
    unpublish_reason: Option<String>,
    retracted_by: Option<ActorId>,
    retracted_at: Option<DateTime<Utc>>,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<RecordRow> for ContentRecord {
    type Error = anyhow::Error;

    fn try_from(row: RecordRow) -> Result<Self, Self::Error> {
        Ok(ContentRecord {
            id: row.id,
            owner_id: row.owner_id,
            classification: Classification::from_str(&row.classification)
                .context("corrupt classification column")?,
            status: RecordStatus::from_str(&row.status).context("corrupt status column")?,
            visible_data: row.visible_data.0,
            pending_change: row.pending_change.map(|json| json.0),
            review_notes: row.review_notes,
            unpublish_reason: row.unpublish_reason,
            retracted_by: row.retracted_by,
            retracted_at: row.retracted_at,
            version: row.version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct AuditRow {
    id: AuditEntryId,
    record_id: RecordId,
    actor: ActorId,
    action: String,
    from_status: String,
    to_status: String,
    at: DateTime<Utc>,
    notes: Option<String>,
}

impl TryFrom<AuditRow> for AuditEntry {
    type Error = anyhow::Error;

    fn try_from(row: AuditRow) -> Result<Self, Self::Error> {
        Ok(AuditEntry {
            id: row.id,
            record_id: row.record_id,
            actor: row.actor,
            action: AuditAction::from_str(&row.action).context("corrupt action column")?,
            from_status: RecordStatus::from_str(&row.from_status)
                .context("corrupt from_status column")?,
            to_status: RecordStatus::from_str(&row.to_status)
                .context("corrupt to_status column")?,
            at: row.at,
            notes: row.notes,
        })
    }
}
