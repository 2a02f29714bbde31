//! Dependency container for the workflow engine (using traits for testability)

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use crate::domains::records::events::NotificationIntent;
use crate::domains::records::store::{InMemoryRecordStore, PgRecordStore, RecordStore};
use crate::kernel::traits::BaseNotifier;

/// Dependencies accessible to the workflow engine (using traits for
/// testability).
#[derive(Clone)]
pub struct RegistryDeps {
    pub store: Arc<dyn RecordStore>,
    pub notifier: Arc<dyn BaseNotifier>,
}

impl RegistryDeps {
    pub fn new(store: Arc<dyn RecordStore>, notifier: Arc<dyn BaseNotifier>) -> Self {
        Self { store, notifier }
    }

    /// Production wiring: Postgres store, log-only notifier.
    pub fn postgres(pool: sqlx::PgPool) -> Self {
        Self::new(
            Arc::new(PgRecordStore::new(pool)),
            Arc::new(TracingNotifier),
        )
    }

    /// In-memory wiring for local tooling and tests that do not care about
    /// notification capture.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryRecordStore::new()),
            Arc::new(TracingNotifier),
        )
    }
}

// =============================================================================
// TracingNotifier (default BaseNotifier implementation)
// =============================================================================

/// Notifier that only logs the intent. Real delivery (email/push) lives in
/// an external service; this keeps the engine runnable without one.
pub struct TracingNotifier;

#[async_trait]
impl BaseNotifier for TracingNotifier {
    async fn deliver(&self, intent: NotificationIntent) -> Result<()> {
        info!(
            record_id = %intent.record_id,
            kind = %intent.kind,
            "notification intent emitted"
        );
        Ok(())
    }
}
