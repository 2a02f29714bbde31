use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::{ActorId, AuditEntryId, RecordId};
use crate::domains::records::models::record::RecordStatus;

/// One immutable line of the audit trail: who did what, when, and why.
///
/// Entries are written in the same atomic commit as the transition they
/// describe and are never updated or deleted, even when the record is
/// retracted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: AuditEntryId,
    pub record_id: RecordId,
    pub actor: ActorId,
    pub action: AuditAction,
    pub from_status: RecordStatus,
    pub to_status: RecordStatus,
    pub at: DateTime<Utc>,
    pub notes: Option<String>,
}

impl AuditEntry {
    pub fn new(
        record_id: RecordId,
        actor: ActorId,
        action: AuditAction,
        from_status: RecordStatus,
        to_status: RecordStatus,
        notes: Option<String>,
    ) -> Self {
        Self {
            id: AuditEntryId::new(),
            record_id,
            actor,
            action,
            from_status,
            to_status,
            at: Utc::now(),
            notes,
        }
    }
}

/// The action that produced an audit entry. One variant per engine
/// operation that commits a transition.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Submit,
    Approve,
    Forward,
    Validate,
    RequestRevision,
    Unpublish,
    StageEdit,
    MergeChange,
    RejectChange,
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditAction::Submit => write!(f, "submit"),
            AuditAction::Approve => write!(f, "approve"),
            AuditAction::Forward => write!(f, "forward"),
            AuditAction::Validate => write!(f, "validate"),
            AuditAction::RequestRevision => write!(f, "request_revision"),
            AuditAction::Unpublish => write!(f, "unpublish"),
            AuditAction::StageEdit => write!(f, "stage_edit"),
            AuditAction::MergeChange => write!(f, "merge_change"),
            AuditAction::RejectChange => write!(f, "reject_change"),
        }
    }
}

impl std::str::FromStr for AuditAction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "submit" => Ok(AuditAction::Submit),
            "approve" => Ok(AuditAction::Approve),
            "forward" => Ok(AuditAction::Forward),
            "validate" => Ok(AuditAction::Validate),
            "request_revision" => Ok(AuditAction::RequestRevision),
            "unpublish" => Ok(AuditAction::Unpublish),
            "stage_edit" => Ok(AuditAction::StageEdit),
            "merge_change" => Ok(AuditAction::MergeChange),
            "reject_change" => Ok(AuditAction::RejectChange),
            _ => Err(anyhow::anyhow!("Invalid audit action: {}", s)),
        }
    }
}
