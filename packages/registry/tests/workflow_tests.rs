//! Integration tests for the record lifecycle: submission, review routing,
//! retraction and the audit trail.

mod common;

use common::{site_data, TestHarness};
use registry_core::common::{ActorId, RecordId};
use registry_core::domains::records::engine::{Caller, UNPUBLISH_REASON_PLACEHOLDER};
use registry_core::domains::records::errors::WorkflowError;
use registry_core::domains::records::events::NotificationKind;
use registry_core::domains::records::models::{AuditAction, Classification, RecordData, RecordStatus};
use registry_core::domains::records::policy::Role;
use serde_json::json;

// =============================================================================
// Submission and validation
// =============================================================================

#[tokio::test]
async fn submit_moves_draft_to_pending_review() {
    let h = TestHarness::new();
    let (record, owner) = h.draft(Classification::Museum).await;

    let updated = h.engine.submit(record.id, owner, site_data()).await.unwrap();

    assert_eq!(updated.status, RecordStatus::PendingReview);
    assert_eq!(updated.visible_data.name, "Guimaraes Castle");
}

#[tokio::test]
async fn submit_with_missing_fields_reports_them_and_changes_nothing() {
    let h = TestHarness::new();
    let (record, owner) = h.draft(Classification::Museum).await;

    let bad = RecordData {
        name: String::new(),
        location: "  ".to_string(),
        ..Default::default()
    };
    let err = h.engine.submit(record.id, owner, bad).await.unwrap_err();

    match err {
        WorkflowError::Validation { fields } => {
            assert_eq!(fields, vec!["name", "location"]);
        }
        other => panic!("expected validation error, got {other:?}"),
    }

    // Record untouched, no audit entry written.
    let unchanged = h.engine.record(record.id).await.unwrap();
    assert_eq!(unchanged.status, RecordStatus::Draft);
    assert_eq!(unchanged.visible_data, record.visible_data);
    assert!(h.engine.audit_trail(record.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn only_the_record_owner_may_submit() {
    let h = TestHarness::new();
    let (record, _owner) = h.draft(Classification::Museum).await;

    let stranger = Caller::new(ActorId::new(), Role::Owner);
    let err = h
        .engine
        .submit(record.id, stranger, site_data())
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::PermissionDenied { .. }));
}

#[tokio::test]
async fn unknown_record_is_not_found() {
    let h = TestHarness::new();
    let err = h.engine.record(RecordId::new()).await.unwrap_err();
    assert!(matches!(err, WorkflowError::NotFound(_)));
}

// =============================================================================
// Review routing
// =============================================================================

#[tokio::test]
async fn approving_a_draft_is_an_invalid_transition() {
    let h = TestHarness::new();
    let (record, _owner) = h.draft(Classification::Museum).await;

    let err = h
        .engine
        .approve(record.id, h.primary_reviewer())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        WorkflowError::InvalidTransition {
            status: RecordStatus::Draft,
            ..
        }
    ));
}

#[tokio::test]
async fn owner_may_not_approve_a_pending_submission() {
    let h = TestHarness::new();
    let (record, owner) = h.draft(Classification::Museum).await;
    h.engine.submit(record.id, owner, site_data()).await.unwrap();

    // Approve is legal here for the primary reviewer, so the owner gets a
    // permission error rather than an invalid transition.
    let err = h.engine.approve(record.id, owner).await.unwrap_err();
    assert!(matches!(err, WorkflowError::PermissionDenied { .. }));
}

#[tokio::test]
async fn scenario_a_specialist_classification_goes_through_validation() {
    let h = TestHarness::new();
    let (record, owner) = h.draft(Classification::Icp).await;
    h.engine.submit(record.id, owner, site_data()).await.unwrap();

    // Primary reviewer cannot approve an ICP record: nobody can.
    let err = h
        .engine
        .approve(record.id, h.primary_reviewer())
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidTransition { .. }));

    // Forwarding is the only way onward.
    let forwarded = h
        .engine
        .forward(record.id, h.primary_reviewer(), None)
        .await
        .unwrap();
    assert_eq!(forwarded.status, RecordStatus::SpecialistReview);

    let validated = h
        .engine
        .validate(
            record.id,
            h.specialist(),
            json!({ "decree": "129/2019", "level": "national" }),
        )
        .await
        .unwrap();
    assert_eq!(validated.status, RecordStatus::Published);
    assert_eq!(
        validated.visible_data.declaration,
        Some(json!({ "decree": "129/2019", "level": "national" }))
    );

    let trail = h.engine.audit_trail(record.id).await.unwrap();
    assert_eq!(trail.len(), 3);
    assert_eq!(
        trail.iter().map(|e| e.action).collect::<Vec<_>>(),
        vec![AuditAction::Submit, AuditAction::Forward, AuditAction::Validate]
    );
}

#[tokio::test]
async fn specialist_record_cannot_publish_without_a_validate() {
    let h = TestHarness::new();
    let (record, owner) = h.draft(Classification::ArchaeologicalSite).await;
    h.engine.submit(record.id, owner, site_data()).await.unwrap();
    h.engine
        .forward(record.id, h.primary_reviewer(), None)
        .await
        .unwrap();

    // At specialist review, approve is still impossible for everyone.
    for caller in [h.primary_reviewer(), h.specialist(), owner] {
        let err = h.engine.approve(record.id, caller).await.unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidTransition { .. }));
    }
    assert_eq!(
        h.engine.record(record.id).await.unwrap().status,
        RecordStatus::SpecialistReview
    );
}

#[tokio::test]
async fn forward_emits_a_specialist_notification_intent() {
    let h = TestHarness::new();
    let (record, owner) = h.draft(Classification::Icp).await;
    h.engine.submit(record.id, owner, site_data()).await.unwrap();
    h.engine
        .forward(record.id, h.primary_reviewer(), Some("needs dating review".to_string()))
        .await
        .unwrap();

    let intents = h.notifier.delivered();
    assert_eq!(intents.len(), 1);
    assert_eq!(intents[0].kind, NotificationKind::ForwardedToSpecialist);
    assert_eq!(intents[0].record_id, record.id);
}

#[tokio::test]
async fn revision_request_returns_record_to_owner_with_reason() {
    let h = TestHarness::new();
    let (record, owner) = h.draft(Classification::Museum).await;
    h.engine.submit(record.id, owner, site_data()).await.unwrap();

    let revised = h
        .engine
        .request_revision(
            record.id,
            h.primary_reviewer(),
            "location is too vague".to_string(),
        )
        .await
        .unwrap();
    assert_eq!(revised.status, RecordStatus::Draft);
    assert_eq!(revised.review_notes.as_deref(), Some("location is too vague"));

    // Only the owner can resubmit from here.
    let err = h
        .engine
        .submit(record.id, h.primary_reviewer(), site_data())
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::PermissionDenied { .. }));

    let resubmitted = h.engine.submit(record.id, owner, site_data()).await.unwrap();
    assert_eq!(resubmitted.status, RecordStatus::PendingReview);
}

#[tokio::test]
async fn specialist_can_send_a_forwarded_submission_back() {
    let h = TestHarness::new();
    let (record, owner) = h.draft(Classification::Icp).await;
    h.engine.submit(record.id, owner, site_data()).await.unwrap();
    h.engine
        .forward(record.id, h.primary_reviewer(), None)
        .await
        .unwrap();

    let revised = h
        .engine
        .request_revision(record.id, h.specialist(), "chronology unsupported".to_string())
        .await
        .unwrap();
    assert_eq!(revised.status, RecordStatus::Draft);
}

// =============================================================================
// Retraction and republication
// =============================================================================

#[tokio::test]
async fn scenario_c_unpublish_then_resubmit_goes_through_review_again() {
    let h = TestHarness::new();
    let (record, owner) = h.published(Classification::Monument).await;

    let retracted = h
        .engine
        .unpublish(record.id, h.primary_reviewer(), "renovation".to_string(), false)
        .await
        .unwrap();
    assert_eq!(retracted.status, RecordStatus::Retracted);
    assert_eq!(retracted.unpublish_reason.as_deref(), Some("renovation"));

    let trail = h.engine.audit_trail(record.id).await.unwrap();
    let unpublish_entry = trail.last().unwrap();
    assert_eq!(unpublish_entry.action, AuditAction::Unpublish);
    assert_eq!(unpublish_entry.notes.as_deref(), Some("renovation"));

    // Resubmission does not shortcut back to published.
    let resubmitted = h.engine.submit(record.id, owner, site_data()).await.unwrap();
    assert_eq!(resubmitted.status, RecordStatus::PendingReview);
    assert!(resubmitted.unpublish_reason.is_none());
    assert!(resubmitted.retracted_at.is_none());
}

#[tokio::test]
async fn unpublish_with_empty_reason_stores_the_placeholder() {
    let h = TestHarness::new();
    let (record, _owner) = h.published(Classification::Museum).await;

    let retracted = h
        .engine
        .unpublish(record.id, h.primary_reviewer(), "   ".to_string(), false)
        .await
        .unwrap();
    assert_eq!(
        retracted.unpublish_reason.as_deref(),
        Some(UNPUBLISH_REASON_PLACEHOLDER)
    );

    let trail = h.engine.audit_trail(record.id).await.unwrap();
    assert_eq!(
        trail.last().unwrap().notes.as_deref(),
        Some(UNPUBLISH_REASON_PLACEHOLDER)
    );
}

#[tokio::test]
async fn unpublish_notifies_the_owner_only_when_asked() {
    let h = TestHarness::new();
    let (record, _owner) = h.published(Classification::Museum).await;
    h.engine
        .unpublish(record.id, h.primary_reviewer(), "safety".to_string(), false)
        .await
        .unwrap();
    assert!(h.notifier.delivered().is_empty());

    let (record2, _owner2) = h.published(Classification::Museum).await;
    h.engine
        .unpublish(record2.id, h.primary_reviewer(), "safety".to_string(), true)
        .await
        .unwrap();

    let intents = h.notifier.delivered();
    assert_eq!(intents.len(), 1);
    assert_eq!(intents[0].kind, NotificationKind::RecordRetracted);
    assert_eq!(intents[0].record_id, record2.id);
}

#[tokio::test]
async fn notifier_failure_never_fails_the_transition() {
    let h = TestHarness::new();
    let (record, _owner) = h.published(Classification::Museum).await;

    h.notifier.fail_deliveries();
    let retracted = h
        .engine
        .unpublish(record.id, h.primary_reviewer(), "flood damage".to_string(), true)
        .await
        .unwrap();
    assert_eq!(retracted.status, RecordStatus::Retracted);
}

#[tokio::test]
async fn only_the_primary_reviewer_may_unpublish() {
    let h = TestHarness::new();
    let (record, owner) = h.published(Classification::Museum).await;

    for caller in [owner, h.specialist()] {
        let err = h
            .engine
            .unpublish(record.id, caller, "nope".to_string(), false)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::PermissionDenied { .. }));
    }
}

// =============================================================================
// Audit trail properties
// =============================================================================

#[tokio::test]
async fn audit_length_matches_successful_transitions_in_call_order() {
    let h = TestHarness::new();
    let (record, owner) = h.draft(Classification::Museum).await;

    // Failed calls must leave no trace in the trail.
    let _ = h.engine.approve(record.id, h.primary_reviewer()).await;
    let _ = h
        .engine
        .submit(record.id, owner, RecordData::default())
        .await;

    h.engine.submit(record.id, owner, site_data()).await.unwrap();
    h.engine
        .request_revision(record.id, h.primary_reviewer(), "more detail".to_string())
        .await
        .unwrap();
    h.engine.submit(record.id, owner, site_data()).await.unwrap();
    h.engine
        .approve(record.id, h.primary_reviewer())
        .await
        .unwrap();
    h.engine
        .unpublish(record.id, h.primary_reviewer(), "works".to_string(), false)
        .await
        .unwrap();

    let trail = h.engine.audit_trail(record.id).await.unwrap();
    assert_eq!(trail.len(), 5);
    assert_eq!(
        trail.iter().map(|e| e.action).collect::<Vec<_>>(),
        vec![
            AuditAction::Submit,
            AuditAction::RequestRevision,
            AuditAction::Submit,
            AuditAction::Approve,
            AuditAction::Unpublish,
        ]
    );
    assert!(trail.windows(2).all(|pair| pair[0].at <= pair[1].at));

    // Retraction keeps the full history.
    assert_eq!(
        h.engine.record(record.id).await.unwrap().status,
        RecordStatus::Retracted
    );
    let retracted = h.engine.list_by_status(RecordStatus::Retracted).await.unwrap();
    assert_eq!(retracted.len(), 1);
    assert_eq!(retracted[0].id, record.id);
}
