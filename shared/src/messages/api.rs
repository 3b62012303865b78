//! Task API request and response bodies

use serde::{Deserialize, Serialize};

use crate::types::{Task, TaskId, TaskStatus};

/// Body of `POST /task`
///
/// Counts are signed so that nonsensical values reach validation
/// instead of failing deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    #[serde(default)]
    pub user: String,
    pub population: i64,
    #[serde(rename = "numInstances")]
    pub num_instances: i64,
    pub formats: Vec<String>,
    pub bucket_name: String,
}

/// `{taskId, status}` acknowledgement of create, delete and done calls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskAck {
    pub task_id: TaskId,
    pub status: TaskStatus,
}

impl From<&Task> for TaskAck {
    fn from(task: &Task) -> Self {
        Self {
            task_id: task.id.clone(),
            status: task.status,
        }
    }
}

/// Response of `GET /task`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskList {
    pub tasks: Vec<Task>,
}

/// Response of `GET /task/:id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatusResponse {
    pub task_id: TaskId,
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elapsed_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub running_instances: Option<usize>,
    pub task: Task,
}

/// Body returned with every non-2xx response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { error: message.into() }
    }
}

/// Render a duration compactly, e.g. `1h2m3s`, `45s`
pub fn format_elapsed(elapsed: chrono::Duration) -> String {
    let total = elapsed.num_seconds().max(0);
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);

    if hours > 0 {
        format!("{hours}h{minutes}m{seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m{seconds}s")
    } else {
        format!("{seconds}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_create_request_uses_original_field_names() {
        let body = r#"{
            "user": "alice",
            "population": 1000,
            "numInstances": 2,
            "formats": ["FHIR", "CSV"],
            "bucketName": "b1"
        }"#;

        let request: CreateTaskRequest = serde_json::from_str(body).unwrap();
        assert_eq!(request.num_instances, 2);
        assert_eq!(request.bucket_name, "b1");
        assert_eq!(request.formats, vec!["FHIR", "CSV"]);
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(Duration::seconds(0)), "0s");
        assert_eq!(format_elapsed(Duration::seconds(45)), "45s");
        assert_eq!(format_elapsed(Duration::seconds(125)), "2m5s");
        assert_eq!(format_elapsed(Duration::seconds(3723)), "1h2m3s");
        assert_eq!(format_elapsed(Duration::seconds(-4)), "0s");
    }
}
