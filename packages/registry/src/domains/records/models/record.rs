use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::common::{ActorId, RecordId};
use crate::domains::records::models::ChangeSet;

/// ContentRecord - a heritage-site profile under lifecycle management.
///
/// The workflow engine is the only writer of `status` and `visible_data`;
/// every other component treats this struct as read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentRecord {
    pub id: RecordId,
    pub owner_id: ActorId,
    pub classification: Classification,
    pub status: RecordStatus,

    /// The currently public snapshot. Only mutated by submit, validate
    /// (declaration merge) and an approved change-set merge.
    pub visible_data: RecordData,

    /// At most one staged edit; only present while the record is published.
    pub pending_change: Option<ChangeSet>,

    /// Free text left by the most recent reviewer action.
    pub review_notes: Option<String>,

    // Retraction tracking
    pub unpublish_reason: Option<String>,
    pub retracted_by: Option<ActorId>,
    pub retracted_at: Option<DateTime<Utc>>,

    /// Optimistic-concurrency token, bumped on every committed transition.
    pub version: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ContentRecord {
    /// Create a fresh draft record. Creation is not a workflow transition
    /// and therefore writes no audit entry.
    pub fn new_draft(owner_id: ActorId, classification: Classification, data: RecordData) -> Self {
        let now = Utc::now();
        Self {
            id: RecordId::new(),
            owner_id,
            classification,
            status: RecordStatus::Draft,
            visible_data: data,
            pending_change: None,
            review_notes: None,
            unpublish_reason: None,
            retracted_by: None,
            retracted_at: None,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

// =============================================================================
// Enums
// =============================================================================

/// Lifecycle status of a record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    Draft,
    PendingReview,
    SpecialistReview,
    Published,
    Retracted,
}

impl RecordStatus {
    pub const ALL: [RecordStatus; 5] = [
        RecordStatus::Draft,
        RecordStatus::PendingReview,
        RecordStatus::SpecialistReview,
        RecordStatus::Published,
        RecordStatus::Retracted,
    ];
}

impl std::fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordStatus::Draft => write!(f, "draft"),
            RecordStatus::PendingReview => write!(f, "pending_review"),
            RecordStatus::SpecialistReview => write!(f, "specialist_review"),
            RecordStatus::Published => write!(f, "published"),
            RecordStatus::Retracted => write!(f, "retracted"),
        }
    }
}

impl std::str::FromStr for RecordStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "draft" => Ok(RecordStatus::Draft),
            "pending_review" => Ok(RecordStatus::PendingReview),
            "specialist_review" => Ok(RecordStatus::SpecialistReview),
            "published" => Ok(RecordStatus::Published),
            "retracted" => Ok(RecordStatus::Retracted),
            _ => Err(anyhow::anyhow!("Invalid record status: {}", s)),
        }
    }
}

/// Classification tag of a heritage site. Closed set; a subset of tags
/// requires an additional domain-specialist approval before publication.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// Classified cultural property ("ICP"). Specialist-required.
    #[serde(rename = "ICP")]
    Icp,
    Monument,
    ReligiousSite,
    /// Specialist-required.
    ArchaeologicalSite,
    Museum,
    NaturalLandmark,
}

impl Classification {
    /// Whether publication of this classification requires a specialist
    /// validation step.
    pub fn specialist_required(&self) -> bool {
        matches!(
            self,
            Classification::Icp | Classification::ArchaeologicalSite
        )
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Classification::Icp => write!(f, "ICP"),
            Classification::Monument => write!(f, "monument"),
            Classification::ReligiousSite => write!(f, "religious_site"),
            Classification::ArchaeologicalSite => write!(f, "archaeological_site"),
            Classification::Museum => write!(f, "museum"),
            Classification::NaturalLandmark => write!(f, "natural_landmark"),
        }
    }
}

impl std::str::FromStr for Classification {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ICP" => Ok(Classification::Icp),
            "monument" => Ok(Classification::Monument),
            "religious_site" => Ok(Classification::ReligiousSite),
            "archaeological_site" => Ok(Classification::ArchaeologicalSite),
            "museum" => Ok(Classification::Museum),
            "natural_landmark" => Ok(Classification::NaturalLandmark),
            _ => Err(anyhow::anyhow!("Invalid classification: {}", s)),
        }
    }
}

// =============================================================================
// Public snapshot
// =============================================================================

/// Geographic point for a site.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// The public snapshot of a record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RecordData {
    pub name: String,
    pub location: String,
    pub summary: Option<String>,
    /// Official heritage designation text (decree number, protection level).
    pub designation: Option<String>,
    pub contact_email: Option<String>,
    pub visiting_hours: Option<String>,
    pub coordinates: Option<Coordinates>,
    /// Declaration metadata attached by a specialist validation.
    pub declaration: Option<JsonValue>,
}

impl RecordData {
    /// Required-field validation for submission. Returns the list of
    /// offending field names, empty when the payload is acceptable.
    pub fn missing_required_fields(&self) -> Vec<String> {
        let mut missing = Vec::new();
        if self.name.trim().is_empty() {
            missing.push("name".to_string());
        }
        if self.location.trim().is_empty() {
            missing.push("location".to_string());
        }
        missing
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn status_string_roundtrip() {
        for status in RecordStatus::ALL {
            let parsed = RecordStatus::from_str(&status.to_string()).unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn invalid_status_is_rejected() {
        assert!(RecordStatus::from_str("archived").is_err());
    }

    #[test]
    fn icp_uses_uppercase_tag() {
        assert_eq!(Classification::Icp.to_string(), "ICP");
        assert_eq!(
            Classification::from_str("ICP").unwrap(),
            Classification::Icp
        );
    }

    #[test]
    fn specialist_required_subset() {
        assert!(Classification::Icp.specialist_required());
        assert!(Classification::ArchaeologicalSite.specialist_required());
        assert!(!Classification::Museum.specialist_required());
        assert!(!Classification::Monument.specialist_required());
    }

    #[test]
    fn missing_required_fields_lists_offenders() {
        let data = RecordData {
            name: " ".to_string(),
            location: String::new(),
            ..Default::default()
        };
        assert_eq!(data.missing_required_fields(), vec!["name", "location"]);

        let ok = RecordData {
            name: "Santa Clara Convent".to_string(),
            location: "Vila do Conde".to_string(),
            ..Default::default()
        };
        assert!(ok.missing_required_fields().is_empty());
    }
}
