//! Change-staging subsystem: the single pending-edit slot on published
//! records and the specialist-routing decision for staged patches.

use chrono::Utc;

use crate::common::ActorId;
use crate::domains::records::errors::WorkflowError;
use crate::domains::records::models::{ChangeSet, RecordData, RecordPatch};

/// Fields whose modification requires domain-specialist sign-off before the
/// change may be merged into the public snapshot.
pub const SPECIALIST_FIELDS: [&str; 4] = ["name", "location", "designation", "coordinates"];

/// Build a change-set from a patch against the current public snapshot.
///
/// The routing decision (`forwarded_to_specialist`) is made here, once, from
/// the intersection of the changed fields with `SPECIALIST_FIELDS`, and is
/// immutable for the lifetime of the change-set.
///
/// A patch that changes nothing is refused: an empty change-set would occupy
/// the single staging slot without any reviewable content.
pub fn stage(
    patch: RecordPatch,
    current: &RecordData,
    submitted_by: ActorId,
) -> Result<ChangeSet, WorkflowError> {
    let changed_fields = patch.changed_fields(current);
    if changed_fields.is_empty() {
        return Err(WorkflowError::Validation {
            fields: vec!["patch".to_string()],
        });
    }

    let forwarded = touches_specialist_fields(&changed_fields);
    let now = Utc::now();
    Ok(ChangeSet {
        proposed: patch,
        changed_fields,
        submitted_by,
        submitted_at: now,
        forwarded_to_specialist: forwarded,
        forwarded_at: forwarded.then_some(now),
        forwarded_by: forwarded.then_some(submitted_by),
    })
}

/// Whether any of the given field names is specialist-relevant.
pub fn touches_specialist_fields(changed_fields: &[String]) -> bool {
    changed_fields
        .iter()
        .any(|field| SPECIALIST_FIELDS.contains(&field.as_str()))
}

/// Merge an approved change-set into the public snapshot, returning the
/// updated snapshot. The caller clears the staging slot in the same commit.
pub fn merge(change: &ChangeSet, current: &RecordData) -> RecordData {
    let mut next = current.clone();
    change.proposed.apply_to(&mut next);
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> RecordData {
        RecordData {
            name: "Bom Jesus Sanctuary".to_string(),
            location: "Braga".to_string(),
            summary: Some("Pilgrimage site".to_string()),
            visiting_hours: Some("8:00-20:00".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn cosmetic_patch_stays_with_primary_reviewer() {
        let patch = RecordPatch {
            summary: Some("Pilgrimage site with baroque stairway".to_string()),
            visiting_hours: Some("8:00-21:00".to_string()),
            ..Default::default()
        };
        let change = stage(patch, &snapshot(), ActorId::new()).unwrap();
        assert!(!change.forwarded_to_specialist);
        assert!(change.forwarded_at.is_none());
        assert!(change.forwarded_by.is_none());
        assert_eq!(change.changed_fields, vec!["summary", "visiting_hours"]);
    }

    #[test]
    fn specialist_field_forwards_at_staging_time() {
        let submitter = ActorId::new();
        let patch = RecordPatch {
            designation: Some("National Monument, decree 129/2019".to_string()),
            ..Default::default()
        };
        let change = stage(patch, &snapshot(), submitter).unwrap();
        assert!(change.forwarded_to_specialist);
        assert!(change.forwarded_at.is_some());
        assert_eq!(change.forwarded_by, Some(submitter));
    }

    #[test]
    fn noop_patch_is_refused() {
        // Same values as the snapshot: nothing actually changes.
        let patch = RecordPatch {
            name: Some("Bom Jesus Sanctuary".to_string()),
            ..Default::default()
        };
        let err = stage(patch, &snapshot(), ActorId::new()).unwrap_err();
        assert!(matches!(err, WorkflowError::Validation { .. }));
    }

    #[test]
    fn merge_applies_patch_without_touching_other_fields() {
        let current = snapshot();
        let patch = RecordPatch {
            summary: Some("Updated summary".to_string()),
            ..Default::default()
        };
        let change = stage(patch, &current, ActorId::new()).unwrap();
        let merged = merge(&change, &current);
        assert_eq!(merged.summary.as_deref(), Some("Updated summary"));
        assert_eq!(merged.name, current.name);
        assert_eq!(merged.visiting_hours, current.visiting_hours);
    }
}
