//! Typed ID definitions for all domain entities.
//!
//! This module defines type aliases for each domain entity, providing
//! compile-time type safety for ID usage throughout the application.

// Re-export the core Id type and version markers
pub use super::id::{Id, V7};

// ============================================================================
// Entity marker types
// ============================================================================

/// Marker type for ContentRecord entities (heritage-site profiles).
pub struct ContentRecord;

/// Marker type for Actor entities (owners and reviewers).
pub struct Actor;

/// Marker type for AuditEntry rows.
pub struct AuditEntry;

// ============================================================================
// Type aliases - the primary API
// ============================================================================

/// Typed ID for ContentRecord entities.
pub type RecordId = Id<ContentRecord>;

/// Typed ID for actors (content owners, reviewers, specialists).
pub type ActorId = Id<Actor>;

/// Typed ID for audit entries.
pub type AuditEntryId = Id<AuditEntry>;
