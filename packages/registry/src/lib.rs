// Heritage Registry - Content Lifecycle Core
//
// This crate is the review-workflow engine behind a directory of heritage
// sites: the state machine, the staged-edit slot on published records, the
// classification-based reviewer routing, and the append-only audit trail.
// Forms, exports, maps and notification delivery live in external services
// that consume this crate's typed API.

pub mod common;
pub mod domains;
pub mod kernel;
