//! The operations the HTTP layer exposes
//!
//! Handlers are thin: they decode the request, call one of these methods
//! and encode the result. Tests drive the router with `MockTaskApi`.

use async_trait::async_trait;

use shared::{ApiResult, CreateTaskRequest, DoneNotification, Task, TaskAck, TaskId, TaskList, TaskStatusResponse};

/// Task operations backing the REST routes
#[mockall::automock]
#[async_trait]
pub trait TaskApi: Send + Sync {
    /// `POST /task`
    async fn create_task(&self, request: CreateTaskRequest) -> ApiResult<TaskAck>;

    /// `GET /task`
    async fn list_tasks(&self) -> ApiResult<TaskList>;

    /// `GET /task/:id`
    async fn task_status(&self, task_id: TaskId) -> ApiResult<TaskStatusResponse>;

    /// `POST /task/:id/abort`
    async fn abort_task(&self, task_id: TaskId) -> ApiResult<Task>;

    /// `DELETE /task/:id`
    async fn delete_task(&self, task_id: TaskId) -> ApiResult<TaskAck>;

    /// `POST /task/:id/done`, called by workers
    async fn worker_done(&self, notification: DoneNotification) -> ApiResult<TaskAck>;

    /// `POST /task/:id/reconcile`
    async fn reconcile_task(&self, task_id: TaskId) -> ApiResult<Task>;
}
