//! Test helpers and builder patterns for orchestrator tests

use std::time::Duration;

use ::orchestrator::services::{InMemoryTaskStore, LocalFleetProvider};
use ::orchestrator::*;
use shared::{InstanceState, InstanceStatus, Task, TaskStatus};

/// Orchestrator over mock adapters
pub type MockOrchestrator = FleetOrchestrator<MockTaskStore, MockFleetProvider>;

/// Orchestrator over the in-memory adapters
pub type LocalOrchestrator = FleetOrchestrator<InMemoryTaskStore, LocalFleetProvider>;

/// Configuration with short adapter timeouts
pub fn test_config() -> OrchestratorConfig {
    OrchestratorConfig::new()
        .with_provider_timeout(Duration::from_millis(200))
        .with_store_timeout(Duration::from_millis(200))
}

/// Builder for orchestrators over mock adapters.
///
/// Mocks start without expectations: any call a test did not set up panics.
pub struct OrchestratorBuilder {
    config: OrchestratorConfig,
    store: MockTaskStore,
    provider: MockFleetProvider,
}

impl OrchestratorBuilder {
    pub fn new() -> Self {
        Self {
            config: test_config(),
            store: MockTaskStore::new(),
            provider: MockFleetProvider::new(),
        }
    }

    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Configure the store mock with a setup function
    pub fn with_store<F>(mut self, setup: F) -> Self
    where
        F: FnOnce(&mut MockTaskStore),
    {
        setup(&mut self.store);
        self
    }

    /// Configure the provider mock with a setup function
    pub fn with_provider<F>(mut self, setup: F) -> Self
    where
        F: FnOnce(&mut MockFleetProvider),
    {
        setup(&mut self.provider);
        self
    }

    /// Store that serves `task` on every `get` and accepts updates
    pub fn with_stored_task(self, task: Task) -> Self {
        self.with_store(move |store| {
            store.expect_get().returning(move |_| Ok(task.clone()));
            store.expect_update().returning(Ok);
        })
    }

    pub fn build(self) -> MockOrchestrator {
        FleetOrchestrator::new(self.config, self.store, self.provider)
    }
}

impl Default for OrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper functions for common test operations
pub struct TestHelpers;

impl TestHelpers {
    /// Orchestrator over fresh in-memory adapters
    pub fn local_orchestrator() -> LocalOrchestrator {
        FleetOrchestrator::new(test_config(), InMemoryTaskStore::new(), LocalFleetProvider::new())
    }

    /// Finish every worker of `task` and send its done ping
    pub async fn finish_all(orchestrator: &LocalOrchestrator, task: &Task) -> Task {
        let mut latest = task.clone();
        for id in &task.instance_ids {
            orchestrator.provider().complete_instance(id).await;
            latest = orchestrator.on_worker_done(&task.id, id).await.unwrap();
        }
        latest
    }

    /// Statuses reporting every instance with the same state
    pub fn statuses(ids: &[shared::InstanceId], state: InstanceState) -> Vec<InstanceStatus> {
        ids.iter().map(|id| InstanceStatus::new(id.clone(), state)).collect()
    }

    /// End time set exactly when terminal, and never before the start
    pub fn assert_time_invariants(task: &Task) {
        let terminal = task.status.is_terminal() || task.status == TaskStatus::Deleted;
        assert_eq!(
            task.end_time.is_some(),
            terminal,
            "end time presence must follow status {}",
            task.status
        );
        if let (Some(start), Some(end)) = (task.start_time, task.end_time) {
            assert!(end >= start, "end {end} before start {start}");
        }
    }
}
