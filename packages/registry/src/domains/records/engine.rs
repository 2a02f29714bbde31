//! Workflow engine: the only writer of record status and public snapshots.
//!
//! Every operation runs the same shape: fetch the record, consult the
//! permission policy, validate the payload, then commit the new state and
//! exactly one audit entry in a single store transaction. Notification
//! intents go out after the commit and never affect its outcome.

use serde_json::{json, Value as JsonValue};
use tracing::{info, warn};

use crate::common::{ActorId, RecordId};
use crate::domains::records::errors::WorkflowError;
use crate::domains::records::events::{NotificationIntent, NotificationKind};
use crate::domains::records::models::{
    AuditAction, AuditEntry, ChangeSet, Classification, ContentRecord, RecordData, RecordPatch,
    RecordStatus,
};
use crate::domains::records::policy::{self, Action, Role};
use crate::domains::records::staging;
use crate::kernel::RegistryDeps;

/// Stored instead of an empty unpublish reason. Retraction must stay
/// available under time pressure, so a missing reason is never a rejection.
pub const UNPUBLISH_REASON_PLACEHOLDER: &str = "no reason provided";

/// The authenticated identity behind a call, as supplied by the external
/// identity layer. The engine trusts it and verifies no credentials.
#[derive(Debug, Clone, Copy)]
pub struct Caller {
    pub id: ActorId,
    pub role: Role,
}

impl Caller {
    pub fn new(id: ActorId, role: Role) -> Self {
        Self { id, role }
    }
}

pub struct WorkflowEngine {
    deps: RegistryDeps,
}

impl WorkflowEngine {
    pub fn new(deps: RegistryDeps) -> Self {
        Self { deps }
    }

    // =========================================================================
    // Read side
    // =========================================================================

    pub async fn record(&self, record_id: RecordId) -> Result<ContentRecord, WorkflowError> {
        self.deps
            .store
            .fetch(record_id)
            .await
            .map_err(|e| WorkflowError::from_store(e, record_id))
    }

    /// Time-ordered audit trail: who did what, when, and why.
    pub async fn audit_trail(&self, record_id: RecordId) -> Result<Vec<AuditEntry>, WorkflowError> {
        self.deps
            .store
            .audit_trail(record_id)
            .await
            .map_err(|e| WorkflowError::from_store(e, record_id))
    }

    pub async fn list_by_status(
        &self,
        status: RecordStatus,
    ) -> Result<Vec<ContentRecord>, WorkflowError> {
        self.deps
            .store
            .list_by_status(status)
            .await
            .map_err(WorkflowError::from)
    }

    // =========================================================================
    // Record creation
    // =========================================================================

    /// Create a fresh draft. Not a workflow transition: no policy check, no
    /// audit entry. Validation happens at submission time.
    pub async fn create_draft(
        &self,
        owner_id: ActorId,
        classification: Classification,
        data: RecordData,
    ) -> Result<ContentRecord, WorkflowError> {
        let record = ContentRecord::new_draft(owner_id, classification, data);
        let record = self
            .deps
            .store
            .insert(record)
            .await
            .map_err(WorkflowError::from)?;
        info!(record_id = %record.id, classification = %record.classification, "draft created");
        Ok(record)
    }

    // =========================================================================
    // Lifecycle operations
    // =========================================================================

    /// Submit a draft (or resubmit a retracted record) for review.
    pub async fn submit(
        &self,
        record_id: RecordId,
        caller: Caller,
        data: RecordData,
    ) -> Result<ContentRecord, WorkflowError> {
        let mut record = self.record(record_id).await?;
        authorize(&record, caller.role, Action::Submit)?;
        require_owner(&record, caller, Action::Submit)?;

        let missing = data.missing_required_fields();
        if !missing.is_empty() {
            return Err(WorkflowError::Validation { fields: missing });
        }

        let from = record.status;
        record.visible_data = data;
        record.status = RecordStatus::PendingReview;
        record.review_notes = None;
        record.unpublish_reason = None;
        record.retracted_by = None;
        record.retracted_at = None;

        let entry = AuditEntry::new(
            record_id,
            caller.id,
            AuditAction::Submit,
            from,
            record.status,
            None,
        );
        let record = self.commit(record, entry).await?;
        info!(record_id = %record_id, from = %from, "record submitted for review");
        Ok(record)
    }

    /// Primary-reviewer approval for classifications that do not require a
    /// specialist. Specialist-required records must go through `forward`.
    pub async fn approve(
        &self,
        record_id: RecordId,
        caller: Caller,
    ) -> Result<ContentRecord, WorkflowError> {
        let mut record = self.record(record_id).await?;
        authorize(&record, caller.role, Action::Approve)?;

        let from = record.status;
        record.status = RecordStatus::Published;

        let entry = AuditEntry::new(
            record_id,
            caller.id,
            AuditAction::Approve,
            from,
            record.status,
            None,
        );
        let record = self.commit(record, entry).await?;
        info!(record_id = %record_id, "record approved and published");
        Ok(record)
    }

    /// Forward a pending submission to the domain-specialist reviewer.
    /// Required for specialist-required classifications.
    pub async fn forward(
        &self,
        record_id: RecordId,
        caller: Caller,
        notes: Option<String>,
    ) -> Result<ContentRecord, WorkflowError> {
        let mut record = self.record(record_id).await?;
        authorize(&record, caller.role, Action::Forward)?;

        let from = record.status;
        record.status = RecordStatus::SpecialistReview;

        let entry = AuditEntry::new(
            record_id,
            caller.id,
            AuditAction::Forward,
            from,
            record.status,
            notes,
        );
        let record = self.commit(record, entry).await?;
        info!(record_id = %record_id, "record forwarded to specialist review");

        self.emit(NotificationIntent::new(
            record_id,
            NotificationKind::ForwardedToSpecialist,
            json!({ "forwarded_by": caller.id }),
        ))
        .await;
        Ok(record)
    }

    /// Specialist validation: publishes the record and attaches the
    /// declaration metadata to the public snapshot.
    pub async fn validate(
        &self,
        record_id: RecordId,
        caller: Caller,
        declaration: JsonValue,
    ) -> Result<ContentRecord, WorkflowError> {
        let mut record = self.record(record_id).await?;
        authorize(&record, caller.role, Action::Validate)?;

        let from = record.status;
        record.status = RecordStatus::Published;
        record.visible_data.declaration = Some(declaration);

        let entry = AuditEntry::new(
            record_id,
            caller.id,
            AuditAction::Validate,
            from,
            record.status,
            None,
        );
        let record = self.commit(record, entry).await?;
        info!(record_id = %record_id, "record validated by specialist and published");
        Ok(record)
    }

    /// Send a submission back to its owner. The record returns to `Draft`;
    /// the reason is preserved in `review_notes` and the audit trail.
    pub async fn request_revision(
        &self,
        record_id: RecordId,
        caller: Caller,
        reason: String,
    ) -> Result<ContentRecord, WorkflowError> {
        let mut record = self.record(record_id).await?;
        authorize(&record, caller.role, Action::RequestRevision)?;

        let from = record.status;
        record.status = RecordStatus::Draft;
        record.review_notes = Some(reason.clone());

        let entry = AuditEntry::new(
            record_id,
            caller.id,
            AuditAction::RequestRevision,
            from,
            record.status,
            Some(reason),
        );
        let record = self.commit(record, entry).await?;
        info!(record_id = %record_id, from = %from, "revision requested");
        Ok(record)
    }

    /// Retract a published record. An empty reason is replaced with a fixed
    /// placeholder, never rejected. Any staged edit is discarded: a staging
    /// slot only exists on published records.
    pub async fn unpublish(
        &self,
        record_id: RecordId,
        caller: Caller,
        reason: String,
        notify_owner: bool,
    ) -> Result<ContentRecord, WorkflowError> {
        let mut record = self.record(record_id).await?;
        authorize(&record, caller.role, Action::Unpublish)?;

        let reason = if reason.trim().is_empty() {
            UNPUBLISH_REASON_PLACEHOLDER.to_string()
        } else {
            reason
        };

        let from = record.status;
        record.status = RecordStatus::Retracted;
        record.unpublish_reason = Some(reason.clone());
        record.retracted_by = Some(caller.id);
        record.retracted_at = Some(chrono::Utc::now());
        record.pending_change = None;

        let entry = AuditEntry::new(
            record_id,
            caller.id,
            AuditAction::Unpublish,
            from,
            record.status,
            Some(reason.clone()),
        );
        let record = self.commit(record, entry).await?;
        info!(record_id = %record_id, reason = %reason, "record retracted");

        if notify_owner {
            self.emit(NotificationIntent::new(
                record_id,
                NotificationKind::RecordRetracted,
                json!({ "reason": reason, "owner_id": record.owner_id }),
            ))
            .await;
        }
        Ok(record)
    }

    // =========================================================================
    // Staged edits on published records
    // =========================================================================

    /// Stage an edit on a published record. The record stays published and
    /// visible throughout review of the edit. Only one edit may be staged at
    /// a time; a second stager gets `EditInProgress` and must retry later.
    pub async fn stage_edit(
        &self,
        record_id: RecordId,
        caller: Caller,
        patch: RecordPatch,
    ) -> Result<ContentRecord, WorkflowError> {
        let mut record = self.record(record_id).await?;
        authorize(&record, caller.role, Action::StageEdit)?;
        require_owner(&record, caller, Action::StageEdit)?;

        if record.pending_change.is_some() {
            return Err(WorkflowError::EditInProgress);
        }

        let change = staging::stage(patch, &record.visible_data, caller.id)?;
        let forwarded = change.forwarded_to_specialist;
        let changed = change.changed_fields.join(", ");
        record.pending_change = Some(change);

        let entry = AuditEntry::new(
            record_id,
            caller.id,
            AuditAction::StageEdit,
            record.status,
            record.status,
            Some(changed),
        );
        let record = self.commit(record, entry).await?;
        info!(record_id = %record_id, forwarded, "edit staged");

        if forwarded {
            self.emit(NotificationIntent::new(
                record_id,
                NotificationKind::ChangeForwarded,
                json!({ "submitted_by": caller.id }),
            ))
            .await;
        }
        Ok(record)
    }

    /// Merge the staged edit into the public snapshot and clear the slot.
    pub async fn approve_change(
        &self,
        record_id: RecordId,
        caller: Caller,
    ) -> Result<ContentRecord, WorkflowError> {
        let mut record = self.record(record_id).await?;
        authorize(&record, caller.role, Action::ApproveChange)?;
        let change = take_pending_change(&mut record, caller, Action::ApproveChange)?;

        record.visible_data = staging::merge(&change, &record.visible_data);

        let entry = AuditEntry::new(
            record_id,
            caller.id,
            AuditAction::MergeChange,
            record.status,
            record.status,
            None,
        );
        let record = self.commit(record, entry).await?;
        info!(record_id = %record_id, "staged edit merged");
        Ok(record)
    }

    /// Discard the staged edit without touching the public snapshot.
    pub async fn reject_change(
        &self,
        record_id: RecordId,
        caller: Caller,
        reason: String,
    ) -> Result<ContentRecord, WorkflowError> {
        let mut record = self.record(record_id).await?;
        authorize(&record, caller.role, Action::RejectChange)?;
        take_pending_change(&mut record, caller, Action::RejectChange)?;

        record.review_notes = Some(reason.clone());

        let entry = AuditEntry::new(
            record_id,
            caller.id,
            AuditAction::RejectChange,
            record.status,
            record.status,
            Some(reason),
        );
        let record = self.commit(record, entry).await?;
        info!(record_id = %record_id, "staged edit rejected");
        Ok(record)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    async fn commit(
        &self,
        record: ContentRecord,
        entry: AuditEntry,
    ) -> Result<ContentRecord, WorkflowError> {
        let record_id = record.id;
        self.deps
            .store
            .commit(record.version, record, entry)
            .await
            .map_err(|e| WorkflowError::from_store(e, record_id))
    }

    /// Fire-and-forget delivery. A notifier failure is logged and swallowed;
    /// the transition that produced the intent has already committed.
    async fn emit(&self, intent: NotificationIntent) {
        let record_id = intent.record_id;
        let kind = intent.kind;
        if let Err(e) = self.deps.notifier.deliver(intent).await {
            warn!(record_id = %record_id, kind = %kind, "notification delivery failed: {e}");
        }
    }
}

/// Policy guard shared by every operation. Distinguishes "nobody may do
/// this here" (`InvalidTransition`) from "someone may, but not you"
/// (`PermissionDenied`).
fn authorize(record: &ContentRecord, role: Role, action: Action) -> Result<(), WorkflowError> {
    let allowed = policy::allowed_transitions(role, record.status, record.classification);
    if allowed.contains(&action) {
        return Ok(());
    }
    if policy::legal_for_any_role(record.status, record.classification, action) {
        Err(WorkflowError::PermissionDenied { role, action })
    } else {
        Err(WorkflowError::InvalidTransition {
            action,
            status: record.status,
        })
    }
}

/// Owner-bound actions additionally require the caller to be the record's
/// owner, not just hold the owner role.
fn require_owner(
    record: &ContentRecord,
    caller: Caller,
    action: Action,
) -> Result<(), WorkflowError> {
    if caller.id != record.owner_id {
        return Err(WorkflowError::PermissionDenied {
            role: caller.role,
            action,
        });
    }
    Ok(())
}

/// Remove the staged change after checking it is routed to the caller's
/// role: forwarded edits belong to the specialist, all others to the
/// primary reviewer.
fn take_pending_change(
    record: &mut ContentRecord,
    caller: Caller,
    action: Action,
) -> Result<ChangeSet, WorkflowError> {
    let Some(change) = record.pending_change.take() else {
        return Err(WorkflowError::InvalidTransition {
            action,
            status: record.status,
        });
    };
    let routed_to = if change.forwarded_to_specialist {
        Role::SpecialistReviewer
    } else {
        Role::PrimaryReviewer
    };
    if caller.role != routed_to {
        record.pending_change = Some(change);
        return Err(WorkflowError::PermissionDenied {
            role: caller.role,
            action,
        });
    }
    Ok(change)
}
