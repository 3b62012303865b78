//! Adapter traits with mockall annotations for testing
//!
//! The orchestrator reaches persistence and the cloud only through these
//! traits. Production wiring injects real implementations; tests inject the
//! generated `MockTaskStore` / `MockFleetProvider`.

use shared::{InstanceId, InstanceStatus, Task, TaskId, WorkerConfig};

use crate::error::OrchestratorResult;

/// Task persistence abstraction
///
/// Tasks are never physically removed: deletion is a status change so the
/// history stays queryable.
#[mockall::automock]
#[async_trait::async_trait]
pub trait TaskStore: Send + Sync {
    /// Insert a new task, assigning an id when the task has none
    ///
    /// # Returns
    /// The id the task was stored under
    async fn create(&self, task: Task) -> OrchestratorResult<TaskId>;

    /// Fetch a task by id, including deleted ones
    ///
    /// # Returns
    /// `TaskNotFound` if no task has this id
    async fn get(&self, task_id: &TaskId) -> OrchestratorResult<Task>;

    /// All tasks whose status is not `Deleted`
    async fn list(&self) -> OrchestratorResult<Vec<Task>>;

    /// Replace the stored record of an existing task
    ///
    /// # Returns
    /// The stored task, or `TaskNotFound` for an unknown id
    async fn update(&self, task: Task) -> OrchestratorResult<Task>;

    /// Set the status of a task to `Deleted`, touching nothing else
    async fn mark_deleted(&self, task_id: &TaskId) -> OrchestratorResult<()>;
}

/// Cloud compute and object storage abstraction
#[mockall::automock]
#[async_trait::async_trait]
pub trait FleetProvider: Send + Sync {
    /// Create an output bucket
    ///
    /// # Returns
    /// `ResourceConflict` if a bucket with this name already exists
    async fn create_bucket(&self, bucket_name: &str) -> OrchestratorResult<()>;

    /// Delete a bucket and its contents
    ///
    /// # Returns
    /// `BucketNotFound` if the bucket does not exist
    async fn delete_bucket(&self, bucket_name: &str) -> OrchestratorResult<()>;

    /// Start `count` workers sharing one configuration, in a single request
    ///
    /// # Returns
    /// Handles of the started instances, in launch order
    async fn start_instances(&self, count: u32, config: &WorkerConfig) -> OrchestratorResult<Vec<InstanceId>>;

    /// Tag instances with the task they work for
    async fn tag_instances(&self, instance_ids: &[InstanceId], task_id: &TaskId) -> OrchestratorResult<()>;

    /// Terminate instances. Already-terminated instances are not an error.
    async fn terminate_instances(&self, instance_ids: &[InstanceId]) -> OrchestratorResult<()>;

    /// Current liveness of each requested instance
    async fn describe_instance_status(&self, instance_ids: &[InstanceId]) -> OrchestratorResult<Vec<InstanceStatus>>;
}
