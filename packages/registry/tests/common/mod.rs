//! Shared harness for workflow integration tests: in-memory store plus a
//! mock notifier that records delivered intents.

use std::sync::Arc;

use registry_core::common::ActorId;
use registry_core::domains::records::engine::{Caller, WorkflowEngine};
use registry_core::domains::records::models::{Classification, ContentRecord, RecordData};
use registry_core::domains::records::policy::Role;
use registry_core::kernel::{test_deps, MockNotifier};

pub struct TestHarness {
    pub engine: WorkflowEngine,
    pub notifier: Arc<MockNotifier>,
}

impl TestHarness {
    pub fn new() -> Self {
        // Ignore the error when a previous test already installed one.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();

        let (deps, notifier) = test_deps();
        Self {
            engine: WorkflowEngine::new(deps),
            notifier,
        }
    }

    pub fn primary_reviewer(&self) -> Caller {
        Caller::new(ActorId::new(), Role::PrimaryReviewer)
    }

    pub fn specialist(&self) -> Caller {
        Caller::new(ActorId::new(), Role::SpecialistReviewer)
    }

    /// Create a draft and return it together with its owner's caller
    /// identity.
    pub async fn draft(&self, classification: Classification) -> (ContentRecord, Caller) {
        let owner = Caller::new(ActorId::new(), Role::Owner);
        let record = self
            .engine
            .create_draft(owner.id, classification, site_data())
            .await
            .expect("failed to create draft");
        (record, owner)
    }

    /// Drive a non-specialist record all the way to `Published`.
    pub async fn published(&self, classification: Classification) -> (ContentRecord, Caller) {
        let (record, owner) = self.draft(classification).await;
        self.engine
            .submit(record.id, owner, site_data())
            .await
            .expect("submit failed");
        let record = self
            .engine
            .approve(record.id, self.primary_reviewer())
            .await
            .expect("approve failed");
        (record, owner)
    }
}

pub fn site_data() -> RecordData {
    RecordData {
        name: "Guimaraes Castle".to_string(),
        location: "Guimaraes".to_string(),
        summary: Some("Tenth-century hilltop castle".to_string()),
        visiting_hours: Some("10:00-18:00".to_string()),
        ..Default::default()
    }
}
