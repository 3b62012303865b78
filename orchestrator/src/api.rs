//! Binds the fleet orchestrator to the HTTP task API

use async_trait::async_trait;

use shared::messages::format_elapsed;
use shared::{ApiResult, CreateTaskRequest, DoneNotification, Task, TaskAck, TaskId, TaskList, TaskStatusResponse};
use webserver::TaskApi;

use crate::orchestrator::{FleetOrchestrator, TaskReport};
use crate::traits::{FleetProvider, TaskStore};

impl From<TaskReport> for TaskStatusResponse {
    fn from(report: TaskReport) -> Self {
        Self {
            task_id: report.task.id.clone(),
            status: report.task.status,
            elapsed_time: report.task.start_time.map(|_| format_elapsed(report.elapsed)),
            running_instances: report.running_instances,
            task: report.task,
        }
    }
}

#[async_trait]
impl<S, F> TaskApi for FleetOrchestrator<S, F>
where
    S: TaskStore + 'static,
    F: FleetProvider + 'static,
{
    async fn create_task(&self, request: CreateTaskRequest) -> ApiResult<TaskAck> {
        let task = FleetOrchestrator::create_task(self, request).await?;
        Ok(TaskAck::from(&task))
    }

    async fn list_tasks(&self) -> ApiResult<TaskList> {
        let tasks = FleetOrchestrator::list_tasks(self).await?;
        Ok(TaskList { tasks })
    }

    async fn task_status(&self, task_id: TaskId) -> ApiResult<TaskStatusResponse> {
        let report = self.get_task_status(&task_id).await?;
        Ok(report.into())
    }

    async fn abort_task(&self, task_id: TaskId) -> ApiResult<Task> {
        Ok(FleetOrchestrator::abort_task(self, &task_id).await?)
    }

    async fn delete_task(&self, task_id: TaskId) -> ApiResult<TaskAck> {
        let task = FleetOrchestrator::delete_task(self, &task_id).await?;
        Ok(TaskAck::from(&task))
    }

    async fn worker_done(&self, notification: DoneNotification) -> ApiResult<TaskAck> {
        let task = self.handle_notification(notification).await?;
        Ok(TaskAck::from(&task))
    }

    async fn reconcile_task(&self, task_id: TaskId) -> ApiResult<Task> {
        Ok(FleetOrchestrator::reconcile_task(self, &task_id).await?)
    }
}
