//! Worker → orchestrator completion callback

use serde::{Deserialize, Serialize};

use crate::types::{InstanceId, TaskId};

/// Sent once by a worker after it finishes writing its output partition.
/// A present `error` reports a fatal failure instead of completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoneNotification {
    pub task_id: TaskId,
    pub instance_id: InstanceId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DoneNotification {
    pub fn done(task_id: TaskId, instance_id: InstanceId) -> Self {
        Self {
            task_id,
            instance_id,
            error: None,
        }
    }

    pub fn failed(task_id: TaskId, instance_id: InstanceId, error: impl Into<String>) -> Self {
        Self {
            task_id,
            instance_id,
            error: Some(error.into()),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}
