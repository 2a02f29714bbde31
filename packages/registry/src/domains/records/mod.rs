// Content lifecycle & review workflow for heritage records

pub mod engine;
pub mod errors;
pub mod events;
pub mod models;
pub mod policy;
pub mod staging;
pub mod store;

pub use engine::{Caller, WorkflowEngine, UNPUBLISH_REASON_PLACEHOLDER};
pub use errors::WorkflowError;
pub use events::{NotificationIntent, NotificationKind};
pub use policy::{Action, Role};
