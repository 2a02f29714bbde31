use thiserror::Error;

use crate::common::RecordId;
use crate::domains::records::models::RecordStatus;
use crate::domains::records::policy::{Action, Role};
use crate::domains::records::store::StoreError;

/// Typed failures of the workflow engine.
///
/// Every failed operation leaves the record byte-identical to its pre-call
/// state; these errors are the only way a caller learns why.
#[derive(Error, Debug)]
pub enum WorkflowError {
    /// The transition is legal in this status, but not for this caller.
    #[error("Permission denied: {role} may not {action} here")]
    PermissionDenied { role: Role, action: Action },

    /// The transition is legal for no role in the record's current status.
    #[error("Invalid transition: cannot {action} a record in status {status}")]
    InvalidTransition {
        action: Action,
        status: RecordStatus,
    },

    /// Payload is missing required fields.
    #[error("Validation failed, missing required fields: {}", fields.join(", "))]
    Validation { fields: Vec<String> },

    /// A change-set is already staged on this record.
    #[error("An edit is already in progress for this record")]
    EditInProgress,

    #[error("Record not found: {0}")]
    NotFound(RecordId),

    /// The store detected a conflicting concurrent write. Safe to retry.
    #[error("Record was modified concurrently, retry the operation")]
    ConcurrentModification,

    #[error("Store error: {0}")]
    Store(#[from] anyhow::Error),
}

impl WorkflowError {
    /// Map a store failure for a specific record into the workflow taxonomy.
    pub(crate) fn from_store(err: StoreError, record_id: RecordId) -> Self {
        match err {
            StoreError::NotFound => WorkflowError::NotFound(record_id),
            StoreError::Conflict => WorkflowError::ConcurrentModification,
            StoreError::Backend(e) => WorkflowError::Store(e),
        }
    }
}

/// For store calls not scoped to a single record (insert, listings).
impl From<StoreError> for WorkflowError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => WorkflowError::Store(anyhow::anyhow!("record not found")),
            StoreError::Conflict => WorkflowError::ConcurrentModification,
            StoreError::Backend(e) => WorkflowError::Store(e),
        }
    }
}
