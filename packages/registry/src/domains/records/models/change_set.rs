use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::ActorId;
use crate::domains::records::models::record::{Coordinates, RecordData};

/// A staged, not-yet-applied edit to an already-published record.
///
/// Created by `stage_edit`, consumed by `approve_change` or `reject_change`.
/// At most one ChangeSet exists per record at any time; that single-slot
/// rule is the engine's only concurrency invariant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChangeSet {
    /// Partial patch against the public snapshot.
    pub proposed: RecordPatch,

    /// Names of the fields that actually differ from the snapshot,
    /// computed once at staging time.
    pub changed_fields: Vec<String>,

    pub submitted_by: ActorId,
    pub submitted_at: DateTime<Utc>,

    /// Routing decision, frozen at staging time. A forwarded edit cannot be
    /// un-forwarded; a misrouted one must be rejected and restaged.
    pub forwarded_to_specialist: bool,
    pub forwarded_at: Option<DateTime<Utc>>,
    pub forwarded_by: Option<ActorId>,
}

/// Partial patch to a record's public snapshot. `None` fields are untouched.
///
/// The specialist declaration is deliberately absent: it is only ever written
/// by a `validate` action, never through the staging slot.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RecordPatch {
    pub name: Option<String>,
    pub location: Option<String>,
    pub summary: Option<String>,
    pub designation: Option<String>,
    pub contact_email: Option<String>,
    pub visiting_hours: Option<String>,
    pub coordinates: Option<Coordinates>,
}

impl RecordPatch {
    /// Field names where the patch proposes a value different from the
    /// current snapshot. Fields left `None` never count as changed.
    pub fn changed_fields(&self, current: &RecordData) -> Vec<String> {
        let mut changed = Vec::new();
        if let Some(name) = &self.name {
            if *name != current.name {
                changed.push("name".to_string());
            }
        }
        if let Some(location) = &self.location {
            if *location != current.location {
                changed.push("location".to_string());
            }
        }
        if let Some(summary) = &self.summary {
            if current.summary.as_ref() != Some(summary) {
                changed.push("summary".to_string());
            }
        }
        if let Some(designation) = &self.designation {
            if current.designation.as_ref() != Some(designation) {
                changed.push("designation".to_string());
            }
        }
        if let Some(contact_email) = &self.contact_email {
            if current.contact_email.as_ref() != Some(contact_email) {
                changed.push("contact_email".to_string());
            }
        }
        if let Some(visiting_hours) = &self.visiting_hours {
            if current.visiting_hours.as_ref() != Some(visiting_hours) {
                changed.push("visiting_hours".to_string());
            }
        }
        if let Some(coordinates) = &self.coordinates {
            if current.coordinates.as_ref() != Some(coordinates) {
                changed.push("coordinates".to_string());
            }
        }
        changed
    }

    /// Merge the patch into a snapshot. Only `Some` fields are applied.
    pub fn apply_to(&self, data: &mut RecordData) {
        if let Some(name) = &self.name {
            data.name = name.clone();
        }
        if let Some(location) = &self.location {
            data.location = location.clone();
        }
        if let Some(summary) = &self.summary {
            data.summary = Some(summary.clone());
        }
        if let Some(designation) = &self.designation {
            data.designation = Some(designation.clone());
        }
        if let Some(contact_email) = &self.contact_email {
            data.contact_email = Some(contact_email.clone());
        }
        if let Some(visiting_hours) = &self.visiting_hours {
            data.visiting_hours = Some(visiting_hours.clone());
        }
        if let Some(coordinates) = &self.coordinates {
            data.coordinates = Some(*coordinates);
        }
    }
}
