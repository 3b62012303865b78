//! Core types used throughout the task orchestration system

pub mod ids;
pub mod task;
pub mod worker;

pub use ids::{InstanceId, TaskId};
pub use task::{OutputFormat, Task, TaskStatus};
pub use worker::{InstanceState, InstanceStatus, WorkerConfig};
