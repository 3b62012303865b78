//! In-memory task store
//!
//! Keeps task records for the lifetime of the process. Deleted tasks stay
//! in the map with status `Deleted` and are only hidden from listings.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::error::{OrchestratorError, OrchestratorResult};
use crate::traits::TaskStore;
use shared::{Task, TaskId, TaskStatus};

#[derive(Default)]
struct StoreState {
    tasks: HashMap<TaskId, Task>,
    /// Insertion order, used for stable listings
    order: Vec<TaskId>,
}

/// Task store backed by a process-local map
#[derive(Default)]
pub struct InMemoryTaskStore {
    state: RwLock<StoreState>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored tasks, deleted ones included
    pub async fn len(&self) -> usize {
        self.state.read().await.tasks.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn create(&self, mut task: Task) -> OrchestratorResult<TaskId> {
        if task.id.is_empty() {
            task.id = TaskId::generate();
            tracing::debug!("No task id found, generated {}", task.id);
        }

        let mut state = self.state.write().await;
        if state.tasks.contains_key(&task.id) {
            return Err(OrchestratorError::store(
                "create",
                format!("a task with id '{}' already exists", task.id),
            ));
        }

        let task_id = task.id.clone();
        state.order.push(task_id.clone());
        state.tasks.insert(task_id.clone(), task);
        tracing::debug!("Created task {}", task_id);
        Ok(task_id)
    }

    async fn get(&self, task_id: &TaskId) -> OrchestratorResult<Task> {
        self.state
            .read()
            .await
            .tasks
            .get(task_id)
            .cloned()
            .ok_or_else(|| OrchestratorError::TaskNotFound {
                task_id: task_id.clone(),
            })
    }

    async fn list(&self) -> OrchestratorResult<Vec<Task>> {
        let state = self.state.read().await;
        Ok(state
            .order
            .iter()
            .filter_map(|id| state.tasks.get(id))
            .filter(|task| task.status != TaskStatus::Deleted)
            .cloned()
            .collect())
    }

    async fn update(&self, task: Task) -> OrchestratorResult<Task> {
        let mut state = self.state.write().await;
        match state.tasks.get_mut(&task.id) {
            Some(stored) => {
                *stored = task.clone();
                tracing::debug!("Updated task {} ({})", task.id, task.status);
                Ok(task)
            }
            None => Err(OrchestratorError::TaskNotFound { task_id: task.id }),
        }
    }

    async fn mark_deleted(&self, task_id: &TaskId) -> OrchestratorResult<()> {
        let mut state = self.state.write().await;
        match state.tasks.get_mut(task_id) {
            Some(stored) => {
                stored.status = TaskStatus::Deleted;
                tracing::debug!("Marked task {} as deleted", task_id);
                Ok(())
            }
            None => Err(OrchestratorError::TaskNotFound {
                task_id: task_id.clone(),
            }),
        }
    }
}
