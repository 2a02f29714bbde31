// TestDependencies - mock implementations for testing
//
// Provides mock services that can be injected into RegistryDeps for tests.

use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;

use crate::domains::records::events::NotificationIntent;
use crate::domains::records::store::InMemoryRecordStore;
use crate::kernel::deps::RegistryDeps;
use crate::kernel::traits::BaseNotifier;

// =============================================================================
// Mock Notifier
// =============================================================================

/// Notifier that records every delivered intent for assertions, and can be
/// told to fail so tests can prove delivery failures never fail transitions.
#[derive(Default)]
pub struct MockNotifier {
    delivered: Arc<Mutex<Vec<NotificationIntent>>>,
    fail: Arc<Mutex<bool>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// All intents delivered so far, in order.
    pub fn delivered(&self) -> Vec<NotificationIntent> {
        self.delivered.lock().unwrap().clone()
    }

    /// Make every subsequent delivery fail.
    pub fn fail_deliveries(&self) {
        *self.fail.lock().unwrap() = true;
    }
}

#[async_trait]
impl BaseNotifier for MockNotifier {
    async fn deliver(&self, intent: NotificationIntent) -> Result<()> {
        if *self.fail.lock().unwrap() {
            anyhow::bail!("notifier unavailable");
        }
        self.delivered.lock().unwrap().push(intent);
        Ok(())
    }
}

// =============================================================================
// Test wiring
// =============================================================================

/// In-memory deps plus a handle to the mock notifier for assertions.
pub fn test_deps() -> (RegistryDeps, Arc<MockNotifier>) {
    let notifier = Arc::new(MockNotifier::new());
    let deps = RegistryDeps::new(Arc::new(InMemoryRecordStore::new()), notifier.clone());
    (deps, notifier)
}
