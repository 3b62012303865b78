//! Fleet orchestrator
//!
//! Drives a task through its lifecycle: provisions the bucket and worker
//! fleet on creation, aggregates worker completion pings, and tears the
//! fleet down on abort. Persistence and cloud access go through the
//! injected [`TaskStore`] and [`FleetProvider`]; every read-modify-write of
//! a task runs under that task's lock.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde_json::json;

use shared::{
    logging, task_debug, task_error, task_info, task_warn, CreateTaskRequest, DoneNotification, InstanceId,
    InstanceState, OutputFormat, Task, TaskId, TaskStatus, WorkerConfig,
};

use crate::config::OrchestratorConfig;
use crate::core::{check_worker_config, partition, InvalidTransition, TaskEvent, TaskLocks, TaskTransition};
use crate::error::{OrchestratorError, OrchestratorResult};
use crate::traits::{FleetProvider, TaskStore};

/// A task together with its derived timing and live fleet figures
#[derive(Debug, Clone, PartialEq)]
pub struct TaskReport {
    pub task: Task,
    /// `end - start`, or `now - start` while the task is still active
    pub elapsed: chrono::Duration,
    /// Workers still running according to the provider; active tasks only
    pub running_instances: Option<usize>,
}

/// Coordinates the task store and the fleet provider
pub struct FleetOrchestrator<S, F>
where
    S: TaskStore,
    F: FleetProvider,
{
    config: OrchestratorConfig,
    store: S,
    provider: F,
    locks: TaskLocks,
}

impl<S, F> FleetOrchestrator<S, F>
where
    S: TaskStore,
    F: FleetProvider,
{
    /// Create new orchestrator with injected dependencies
    pub fn new(config: OrchestratorConfig, store: S, provider: F) -> Self {
        Self {
            config,
            store,
            provider,
            locks: TaskLocks::new(),
        }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn provider(&self) -> &F {
        &self.provider
    }

    pub fn locks(&self) -> &TaskLocks {
        &self.locks
    }

    /// Provision a bucket and a worker fleet for a new task.
    ///
    /// Input is fully validated before the provider is touched. Once the
    /// bucket exists, any later failure triggers a compensating teardown;
    /// if that teardown fails too, `PartialCreation` names what is left.
    pub async fn create_task(&self, request: CreateTaskRequest) -> OrchestratorResult<Task> {
        let split = partition(request.population, request.num_instances, self.config.min_population_size)
            .map_err(|e| OrchestratorError::config(e.to_string()))?;
        let formats = OutputFormat::parse_list(&request.formats).map_err(|e| OrchestratorError::config(e.to_string()))?;

        let task_id = TaskId::generate();
        let worker_config = WorkerConfig {
            task_id: task_id.clone(),
            population: split.share,
            bucket_name: request.bucket_name.clone(),
            bucket_region: self.config.bucket_region.clone(),
            done_endpoint: self.config.done_url(&task_id),
            formats: formats.clone(),
            years_of_history: self.config.years_of_history,
        };
        // Every worker receives this same configuration
        check_worker_config(&worker_config, self.config.min_population_size)
            .map_err(|failure| OrchestratorError::config(failure.to_string()))?;

        if split.remainder > 0 {
            task_warn!(
                task_id,
                "Population {} does not split evenly across {} workers; {} record(s) dropped",
                request.population,
                split.workers,
                split.remainder
            );
        }

        let _guard = self.locks.acquire(&task_id).await;
        let bucket_name = request.bucket_name.as_str();

        self.log_provider_request(&task_id, "create_bucket", json!({ "bucket": bucket_name }));
        self.provider_call("create_bucket", self.provider.create_bucket(bucket_name))
            .await?;

        self.log_provider_request(
            &task_id,
            "start_instances",
            json!({ "count": split.workers, "config": &worker_config }),
        );
        let instance_ids = match self
            .provider_call("start_instances", self.provider.start_instances(split.workers, &worker_config))
            .await
        {
            Ok(ids) => ids,
            Err(cause) => return Err(self.roll_back_creation(&task_id, bucket_name, Vec::new(), cause).await),
        };

        self.log_provider_request(&task_id, "tag_instances", json!({ "instances": &instance_ids }));
        if let Err(cause) = self
            .provider_call("tag_instances", self.provider.tag_instances(&instance_ids, &task_id))
            .await
        {
            return Err(self.roll_back_creation(&task_id, bucket_name, instance_ids, cause).await);
        }

        let mut task = Task::new(task_id.clone(), request.user, bucket_name, formats);
        task.instance_ids = instance_ids.clone();
        task.start(Utc::now());

        match self.store_call("create", self.store.create(task.clone())).await {
            Ok(stored_id) => task.id = stored_id,
            Err(cause) => return Err(self.roll_back_creation(&task_id, bucket_name, instance_ids, cause).await),
        }

        task_info!(
            task.id,
            "🚀 Task created: {} worker(s) x {} patients into bucket '{}'",
            split.workers,
            split.share,
            task.bucket_name
        );
        Ok(task)
    }

    /// All tasks that have not been deleted
    pub async fn list_tasks(&self) -> OrchestratorResult<Vec<Task>> {
        self.store_call("list", self.store.list()).await
    }

    /// The stored record of a task, including deleted ones
    pub async fn get_task(&self, task_id: &TaskId) -> OrchestratorResult<Task> {
        self.load(task_id).await
    }

    /// Task with elapsed time and, while active, a live running-worker count.
    ///
    /// The running count is informational; a provider failure there is
    /// logged and the count omitted.
    pub async fn get_task_status(&self, task_id: &TaskId) -> OrchestratorResult<TaskReport> {
        let task = self.load(task_id).await?;
        ensure_not_deleted(&task, "query")?;

        let running_instances = if task.status.is_active() {
            self.count_running(&task).await
        } else {
            None
        };

        Ok(TaskReport {
            elapsed: task.elapsed(Utc::now()),
            running_instances,
            task,
        })
    }

    /// Terminate the fleet, delete the bucket and mark the task aborted.
    ///
    /// Either provider call failing leaves the task `Active`; the call can
    /// be retried.
    pub async fn abort_task(&self, task_id: &TaskId) -> OrchestratorResult<Task> {
        let _guard = self.locks.acquire(task_id).await;
        let mut task = self.load(task_id).await?;
        TaskTransition::check(task.status, TaskEvent::AbortRequested).map_err(|e| invalid_state(task_id, e))?;

        if !task.instance_ids.is_empty() {
            self.log_provider_request(task_id, "terminate_instances", json!({ "instances": &task.instance_ids }));
            self.provider_call("terminate_instances", self.provider.terminate_instances(&task.instance_ids))
                .await?;
        }

        self.log_provider_request(task_id, "delete_bucket", json!({ "bucket": &task.bucket_name }));
        match self
            .provider_call("delete_bucket", self.provider.delete_bucket(&task.bucket_name))
            .await
        {
            Ok(()) => {}
            Err(OrchestratorError::BucketNotFound { bucket_name }) => {
                task_warn!(task_id, "Bucket '{}' was already gone", bucket_name);
            }
            Err(e) => return Err(e),
        }

        self.transition(&mut task, TaskEvent::AbortRequested, Utc::now())?;
        let task = self.store_call("update", self.store.update(task)).await?;

        task_info!(task_id, "🛑 Task aborted after {}", describe_elapsed(&task));
        Ok(task)
    }

    /// Mark a finished task as deleted. The record itself is kept.
    pub async fn delete_task(&self, task_id: &TaskId) -> OrchestratorResult<Task> {
        let _guard = self.locks.acquire(task_id).await;
        let mut task = self.load(task_id).await?;
        TaskTransition::check(task.status, TaskEvent::DeleteRequested).map_err(|e| invalid_state(task_id, e))?;

        self.store_call("mark_deleted", self.store.mark_deleted(task_id))
            .await?;
        self.transition(&mut task, TaskEvent::DeleteRequested, Utc::now())?;

        task_info!(task_id, "🗑️  Task deleted");
        Ok(task)
    }

    /// Route a worker callback to the done or the failure path
    pub async fn handle_notification(&self, notification: DoneNotification) -> OrchestratorResult<Task> {
        match notification.error {
            Some(error) => {
                self.on_worker_failed(&notification.task_id, &notification.instance_id, &error)
                    .await
            }
            None => {
                self.on_worker_done(&notification.task_id, &notification.instance_id)
                    .await
            }
        }
    }

    /// Record that one worker finished; complete the task when none is left.
    ///
    /// Repeating a ping for an instance that already reported is a no-op
    /// while the task is active or completed. Aborted and failed tasks
    /// reject every ping.
    pub async fn on_worker_done(&self, task_id: &TaskId, instance_id: &InstanceId) -> OrchestratorResult<Task> {
        let _guard = self.locks.acquire(task_id).await;
        let mut task = self.load(task_id).await?;
        ensure_not_deleted(&task, TaskEvent::AllWorkersDone.operation())?;
        ensure_member(&task, instance_id)?;

        if already_reported(&task, instance_id) {
            task_debug!(task_id, "Duplicate done ping from {}", instance_id);
            return Ok(task);
        }
        TaskTransition::check(task.status, TaskEvent::AllWorkersDone).map_err(|e| invalid_state(task_id, e))?;

        self.record_completions(&mut task, [instance_id.clone()], Utc::now())?;
        let task = self.store_call("update", self.store.update(task)).await?;

        if task.status == TaskStatus::Completed {
            task_info!(task_id, "✅ All {} worker(s) done in {}", task.instance_ids.len(), describe_elapsed(&task));
        } else {
            task_debug!(
                task_id,
                "Worker {} done, {} outstanding",
                instance_id,
                task.outstanding_instances().len()
            );
        }
        Ok(task)
    }

    /// A worker reported a fatal error: fail the task and stop the rest of
    /// the fleet. The bucket is kept for inspection.
    ///
    /// An error from an instance that already reported done does not undo
    /// its result; the task is returned unchanged.
    pub async fn on_worker_failed(
        &self,
        task_id: &TaskId,
        instance_id: &InstanceId,
        error: &str,
    ) -> OrchestratorResult<Task> {
        let _guard = self.locks.acquire(task_id).await;
        let mut task = self.load(task_id).await?;
        ensure_not_deleted(&task, TaskEvent::WorkerFailed.operation())?;
        ensure_member(&task, instance_id)?;

        if already_reported(&task, instance_id) {
            task_warn!(task_id, "Ignoring failure from {} after it reported done: {}", instance_id, error);
            return Ok(task);
        }
        self.transition(&mut task, TaskEvent::WorkerFailed, Utc::now())?;
        task.error_message = Some(format!("instance {instance_id}: {error}"));
        let task = self.store_call("update", self.store.update(task)).await?;
        task_error!(task_id, "💥 Worker {} failed: {}", instance_id, error);

        let outstanding = task.outstanding_instances();
        if !outstanding.is_empty() {
            self.log_provider_request(task_id, "terminate_instances", json!({ "instances": &outstanding }));
            if let Err(e) = self
                .provider_call("terminate_instances", self.provider.terminate_instances(&outstanding))
                .await
            {
                task_warn!(task_id, "Could not terminate {} remaining worker(s): {}", outstanding.len(), e);
            }
        }
        Ok(task)
    }

    /// Pull instance status from the provider and treat every finished
    /// instance as if it had pinged. For workers whose ping was lost.
    ///
    /// Tasks that already ended are returned unchanged.
    pub async fn reconcile_task(&self, task_id: &TaskId) -> OrchestratorResult<Task> {
        let _guard = self.locks.acquire(task_id).await;
        let mut task = self.load(task_id).await?;
        ensure_not_deleted(&task, "reconcile")?;
        if !task.status.is_active() {
            return Ok(task);
        }

        let outstanding = task.outstanding_instances();
        let finished: Vec<InstanceId> = if outstanding.is_empty() {
            Vec::new()
        } else {
            self.log_provider_request(task_id, "describe_instance_status", json!({ "instances": &outstanding }));
            self.provider_call(
                "describe_instance_status",
                self.provider.describe_instance_status(&outstanding),
            )
            .await?
            .into_iter()
            .filter(|status| status.is_done())
            .map(|status| status.instance_id)
            .collect()
        };

        if !self.record_completions(&mut task, finished.iter().cloned(), Utc::now())? {
            return Ok(task);
        }
        let task = self.store_call("update", self.store.update(task)).await?;
        task_info!(task_id, "🔄 Reconciled {} finished worker(s), task is {}", finished.len(), task.status);
        Ok(task)
    }

    /// Add finished instances to the completion set and complete the task
    /// once nothing is outstanding. Returns whether the task changed.
    fn record_completions(
        &self,
        task: &mut Task,
        finished: impl IntoIterator<Item = InstanceId>,
        now: DateTime<Utc>,
    ) -> OrchestratorResult<bool> {
        let mut changed = false;
        for instance_id in finished {
            if task.has_instance(&instance_id) {
                changed |= task.completed_instance_ids.insert(instance_id);
            }
        }
        if task.status.is_active() && task.all_instances_done() {
            self.transition(task, TaskEvent::AllWorkersDone, now)?;
            changed = true;
        }
        Ok(changed)
    }

    fn transition(&self, task: &mut Task, event: TaskEvent, now: DateTime<Utc>) -> OrchestratorResult<TaskStatus> {
        let task_id = task.id.clone();
        TaskTransition::apply(task, event, now).map_err(|e| invalid_state(&task_id, e))
    }

    async fn count_running(&self, task: &Task) -> Option<usize> {
        if task.instance_ids.is_empty() {
            return Some(0);
        }
        match self
            .provider_call(
                "describe_instance_status",
                self.provider.describe_instance_status(&task.instance_ids),
            )
            .await
        {
            Ok(statuses) => Some(
                statuses
                    .iter()
                    .filter(|status| status.status == InstanceState::Active)
                    .count(),
            ),
            Err(e) => {
                task_warn!(task.id, "Could not describe workers: {}", e);
                None
            }
        }
    }

    /// Best-effort teardown of a half-created task.
    ///
    /// # Returns
    /// `cause` when everything was cleaned up, `PartialCreation` otherwise
    async fn roll_back_creation(
        &self,
        task_id: &TaskId,
        bucket_name: &str,
        instance_ids: Vec<InstanceId>,
        cause: OrchestratorError,
    ) -> OrchestratorError {
        task_warn!(task_id, "Task creation failed ({}), rolling back", cause);
        let mut clean = true;
        let mut orphaned = Vec::new();

        if !instance_ids.is_empty() {
            if let Err(e) = self
                .provider_call("terminate_instances", self.provider.terminate_instances(&instance_ids))
                .await
            {
                task_error!(task_id, "Rollback could not terminate workers: {}", e);
                clean = false;
                orphaned = instance_ids;
            }
        }

        match self
            .provider_call("delete_bucket", self.provider.delete_bucket(bucket_name))
            .await
        {
            Ok(()) | Err(OrchestratorError::BucketNotFound { .. }) => {}
            Err(e) => {
                task_error!(task_id, "Rollback could not delete bucket '{}': {}", bucket_name, e);
                clean = false;
            }
        }

        if clean {
            return cause;
        }
        logging::log_error(
            "orchestrator",
            &format!("creation of task {task_id}"),
            &cause,
        );
        OrchestratorError::PartialCreation {
            task_id: task_id.clone(),
            bucket_name: bucket_name.to_string(),
            instance_ids: orphaned,
            cause: cause.to_string(),
        }
    }

    async fn load(&self, task_id: &TaskId) -> OrchestratorResult<Task> {
        self.store_call("get", self.store.get(task_id)).await
    }

    fn log_provider_request(&self, task_id: &TaskId, operation: &str, payload: serde_json::Value) {
        if self.config.verbose_provider_logging {
            task_info!(task_id, "☁️  {} {}", operation, payload);
        } else {
            task_debug!(task_id, "☁️  {}", operation);
        }
    }

    async fn provider_call<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = OrchestratorResult<T>>,
    ) -> OrchestratorResult<T> {
        let timeout = self.config.provider_timeout;
        tokio::time::timeout(timeout, call)
            .await
            .unwrap_or(Err(OrchestratorError::ProviderTimeout { operation, timeout }))
    }

    async fn store_call<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = OrchestratorResult<T>>,
    ) -> OrchestratorResult<T> {
        let timeout = self.config.store_timeout;
        tokio::time::timeout(timeout, call)
            .await
            .unwrap_or(Err(OrchestratorError::StoreTimeout { operation, timeout }))
    }
}

fn invalid_state(task_id: &TaskId, rejected: InvalidTransition) -> OrchestratorError {
    OrchestratorError::InvalidState {
        task_id: task_id.clone(),
        status: rejected.from,
        operation: rejected.event.operation(),
    }
}

fn ensure_not_deleted(task: &Task, operation: &'static str) -> OrchestratorResult<()> {
    if task.status == TaskStatus::Deleted {
        return Err(OrchestratorError::InvalidState {
            task_id: task.id.clone(),
            status: task.status,
            operation,
        });
    }
    Ok(())
}

fn ensure_member(task: &Task, instance_id: &InstanceId) -> OrchestratorResult<()> {
    if task.has_instance(instance_id) {
        Ok(())
    } else {
        Err(OrchestratorError::InstanceNotFound {
            task_id: task.id.clone(),
            instance_id: instance_id.clone(),
        })
    }
}

/// The instance is in the completion set of a task that still honours it
fn already_reported(task: &Task, instance_id: &InstanceId) -> bool {
    matches!(task.status, TaskStatus::Active | TaskStatus::Completed) && task.completed_instance_ids.contains(instance_id)
}

fn describe_elapsed(task: &Task) -> String {
    shared::messages::format_elapsed(task.elapsed(Utc::now()))
}
