pub mod audit;
pub mod change_set;
pub mod record;

pub use audit::{AuditAction, AuditEntry};
pub use change_set::{ChangeSet, RecordPatch};
pub use record::{Classification, ContentRecord, Coordinates, RecordData, RecordStatus};
