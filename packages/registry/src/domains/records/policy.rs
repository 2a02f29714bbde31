//! Permission policy: the single place where role-based routing lives.
//!
//! Every workflow engine operation consults `allowed_transitions` before
//! touching any state. The function is pure: no I/O, no clock, no store.

use serde::{Deserialize, Serialize};

use crate::domains::records::models::{Classification, RecordStatus};

/// The role an authenticated actor holds for a call. Supplied by the
/// identity layer; the engine trusts it and performs no credential checks.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Owner,
    PrimaryReviewer,
    SpecialistReviewer,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Owner, Role::PrimaryReviewer, Role::SpecialistReviewer];
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Owner => write!(f, "owner"),
            Role::PrimaryReviewer => write!(f, "primary_reviewer"),
            Role::SpecialistReviewer => write!(f, "specialist_reviewer"),
        }
    }
}

/// One requested workflow operation, as seen by the policy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Submit,
    Approve,
    Forward,
    Validate,
    RequestRevision,
    Unpublish,
    StageEdit,
    ApproveChange,
    RejectChange,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Submit => write!(f, "submit"),
            Action::Approve => write!(f, "approve"),
            Action::Forward => write!(f, "forward"),
            Action::Validate => write!(f, "validate"),
            Action::RequestRevision => write!(f, "request_revision"),
            Action::Unpublish => write!(f, "unpublish"),
            Action::StageEdit => write!(f, "stage_edit"),
            Action::ApproveChange => write!(f, "approve_change"),
            Action::RejectChange => write!(f, "reject_change"),
        }
    }
}

/// The set of actions `role` may request on a record in `status` with the
/// given `classification`.
///
/// The change-set actions listed for reviewers at `Published` are further
/// gated by the staging subsystem (specialist-forwarded edits belong to the
/// specialist, everything else to the primary reviewer); the policy only
/// decides who may touch the staging slot at all.
pub fn allowed_transitions(
    role: Role,
    status: RecordStatus,
    classification: Classification,
) -> &'static [Action] {
    match (role, status) {
        // Owner: submit drafts, resubmit retracted records, stage edits on
        // published ones.
        (Role::Owner, RecordStatus::Draft) => &[Action::Submit],
        (Role::Owner, RecordStatus::Retracted) => &[Action::Submit],
        (Role::Owner, RecordStatus::Published) => &[Action::StageEdit],
        (Role::Owner, _) => &[],

        // Primary reviewer: triage pending submissions, manage published
        // records. Specialist-required classifications must be forwarded,
        // never approved directly.
        (Role::PrimaryReviewer, RecordStatus::PendingReview) => {
            if classification.specialist_required() {
                &[Action::Forward, Action::RequestRevision]
            } else {
                &[Action::Approve, Action::RequestRevision]
            }
        }
        (Role::PrimaryReviewer, RecordStatus::Published) => {
            &[Action::Unpublish, Action::ApproveChange, Action::RejectChange]
        }
        (Role::PrimaryReviewer, _) => &[],

        // Specialist reviewer: validate forwarded submissions and forwarded
        // change-sets.
        (Role::SpecialistReviewer, RecordStatus::SpecialistReview) => {
            &[Action::Validate, Action::RequestRevision]
        }
        (Role::SpecialistReviewer, RecordStatus::Published) => {
            &[Action::ApproveChange, Action::RejectChange]
        }
        (Role::SpecialistReviewer, _) => &[],
    }
}

/// Whether any role at all may perform `action` in this status. Lets the
/// engine distinguish `InvalidTransition` (nobody can) from
/// `PermissionDenied` (somebody can, just not this caller).
pub fn legal_for_any_role(
    status: RecordStatus,
    classification: Classification,
    action: Action,
) -> bool {
    Role::ALL
        .iter()
        .any(|role| allowed_transitions(*role, status, classification).contains(&action))
}
