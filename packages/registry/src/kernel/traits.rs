// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Naming convention: Base* for trait names (e.g., BaseNotifier)

use anyhow::Result;
use async_trait::async_trait;

use crate::domains::records::events::NotificationIntent;

// =============================================================================
// Notifier Trait (Infrastructure - delivery of notification intents)
// =============================================================================

/// Delivers notification intents emitted by the workflow engine.
///
/// Delivery is best-effort and fire-and-forget relative to the transition
/// that produced the intent: implementations may fail, the engine logs and
/// moves on.
#[async_trait]
pub trait BaseNotifier: Send + Sync {
    async fn deliver(&self, intent: NotificationIntent) -> Result<()>;
}
