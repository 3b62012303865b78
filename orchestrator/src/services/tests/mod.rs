//! Service-specific tests
//!
//! Each service has its own test file with dedicated fixtures and helpers.


// Common test utilities for services
pub mod common {
    use shared::{OutputFormat, Task, TaskId, WorkerConfig};

    /// Active task with a fixed id
    pub fn test_task(id: &str) -> Task {
        Task::new(TaskId::from(id), "alice", format!("bucket-{id}"), vec![OutputFormat::Fhir])
    }

    /// Worker configuration that passes validation
    pub fn test_worker_config(task_id: &str) -> WorkerConfig {
        WorkerConfig {
            task_id: TaskId::from(task_id),
            population: 500,
            bucket_name: format!("bucket-{task_id}"),
            bucket_region: "us-east-1".to_string(),
            done_endpoint: format!("http://localhost:8080/task/{task_id}/done"),
            formats: vec![OutputFormat::Fhir, OutputFormat::Csv],
            years_of_history: 5,
        }
    }
}
