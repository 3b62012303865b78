//! Test fixtures for orchestrator tests

use chrono::{Duration, Utc};
use shared::{CreateTaskRequest, InstanceId, OutputFormat, Task, TaskId, TaskStatus};

/// Canonical test data
pub struct TestFixtures;

impl TestFixtures {
    pub const DEFAULT_POPULATION: i64 = 1000;
    pub const DEFAULT_WORKERS: i64 = 2;
    pub const BUCKET: &'static str = "b1";
    pub const USER: &'static str = "alice";

    /// Population 1000 over 2 workers, FHIR and CSV, bucket `b1`
    pub fn create_request() -> CreateTaskRequest {
        Self::create_request_with(Self::DEFAULT_POPULATION, Self::DEFAULT_WORKERS)
    }

    pub fn create_request_with(population: i64, workers: i64) -> CreateTaskRequest {
        CreateTaskRequest {
            user: Self::USER.to_string(),
            population,
            num_instances: workers,
            formats: vec!["FHIR".to_string(), "CSV".to_string()],
            bucket_name: Self::BUCKET.to_string(),
        }
    }

    pub fn task_id() -> TaskId {
        TaskId::from("5e6b1c0f7e0b4c5e9d2a1f3b8c7d6e5f")
    }

    /// `i-0`, `i-1`, ...
    pub fn instance_ids(count: usize) -> Vec<InstanceId> {
        (0..count).map(|i| InstanceId::new(format!("i-{i}"))).collect()
    }

    /// Active task started a minute ago with `workers` instances
    pub fn active_task(workers: usize) -> Task {
        let mut task = Task::new(
            Self::task_id(),
            Self::USER,
            Self::BUCKET,
            vec![OutputFormat::Fhir, OutputFormat::Csv],
        );
        task.instance_ids = Self::instance_ids(workers);
        task.start(Utc::now() - Duration::minutes(1));
        task
    }

    /// Task that already reached `status`, with its end time set when terminal
    pub fn task_in(status: TaskStatus, workers: usize) -> Task {
        let mut task = Self::active_task(workers);
        if status.is_terminal() || status == TaskStatus::Deleted {
            task.end(Utc::now());
        }
        task.status = status;
        task
    }
}
