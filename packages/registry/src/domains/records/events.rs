//! Notification intents emitted by the workflow engine.
//!
//! The engine only decides *that* someone should be told; delivery (email,
//! push) belongs to the external notifier and is best-effort. A delivery
//! failure never rolls back the transition that produced the intent.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::common::RecordId;

/// What happened, from the notifier's point of view.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// A published record was retracted; the owner asked to be told.
    RecordRetracted,
    /// A pending submission was forwarded to a specialist reviewer.
    ForwardedToSpecialist,
    /// A staged edit was routed to a specialist reviewer.
    ChangeForwarded,
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationKind::RecordRetracted => write!(f, "record_retracted"),
            NotificationKind::ForwardedToSpecialist => write!(f, "forwarded_to_specialist"),
            NotificationKind::ChangeForwarded => write!(f, "change_forwarded"),
        }
    }
}

/// A single notification the engine wants delivered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationIntent {
    pub record_id: RecordId,
    pub kind: NotificationKind,
    pub payload: JsonValue,
}

impl NotificationIntent {
    pub fn new(record_id: RecordId, kind: NotificationKind, payload: JsonValue) -> Self {
        Self {
            record_id,
            kind,
            payload,
        }
    }
}
