//! Worker configuration and liveness types

use serde::{Deserialize, Serialize};

use super::ids::{InstanceId, TaskId};
use super::task::OutputFormat;

/// Configuration handed to each launched worker, serialized as JSON user data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerConfig {
    pub task_id: TaskId,
    /// This worker's slice of the task population
    pub population: u32,
    pub bucket_name: String,
    pub bucket_region: String,
    /// The endpoint the worker pings when its partition is written
    pub done_endpoint: String,
    pub formats: Vec<OutputFormat>,
    pub years_of_history: u32,
}

/// Point-in-time liveness of a worker instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstanceState {
    Active,
    Done,
}

/// Status projection reported by the fleet provider. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceStatus {
    pub instance_id: InstanceId,
    pub status: InstanceState,
}

impl InstanceStatus {
    pub fn new(instance_id: InstanceId, status: InstanceState) -> Self {
        Self { instance_id, status }
    }

    pub fn is_done(&self) -> bool {
        self.status == InstanceState::Done
    }
}
