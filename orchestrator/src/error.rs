//! Orchestrator-specific error types

use shared::{ApiError, ErrorKind, InstanceId, SharedError, TaskId, TaskStatus};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("Configuration error: {reason}")]
    ConfigurationError { reason: String },

    #[error("Bucket '{bucket_name}' already exists")]
    ResourceConflict { bucket_name: String },

    #[error("Task '{task_id}' not found")]
    TaskNotFound { task_id: TaskId },

    #[error("Instance '{instance_id}' does not belong to task '{task_id}'")]
    InstanceNotFound { task_id: TaskId, instance_id: InstanceId },

    #[error("Cannot {operation} task '{task_id}' while it is {status}")]
    InvalidState {
        task_id: TaskId,
        status: TaskStatus,
        operation: &'static str,
    },

    #[error("Bucket '{bucket_name}' not found")]
    BucketNotFound { bucket_name: String },

    #[error("Fleet provider {operation} failed: {message}")]
    ProviderError { operation: &'static str, message: String },

    #[error("Fleet provider {operation} timed out after {timeout:?}")]
    ProviderTimeout { operation: &'static str, timeout: Duration },

    #[error("Task store {operation} failed: {message}")]
    StoreError { operation: &'static str, message: String },

    #[error("Task store {operation} timed out after {timeout:?}")]
    StoreTimeout { operation: &'static str, timeout: Duration },

    #[error(
        "Creation of task '{task_id}' failed ({cause}) and cleanup was incomplete: bucket '{bucket_name}', instances {instance_ids:?} may be orphaned"
    )]
    PartialCreation {
        task_id: TaskId,
        bucket_name: String,
        instance_ids: Vec<InstanceId>,
        cause: String,
    },

    #[error("Shared component error: {0}")]
    SharedError(#[from] SharedError),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl OrchestratorError {
    pub fn config(reason: impl Into<String>) -> Self {
        Self::ConfigurationError { reason: reason.into() }
    }

    pub fn provider(operation: &'static str, message: impl Into<String>) -> Self {
        Self::ProviderError {
            operation,
            message: message.into(),
        }
    }

    pub fn store(operation: &'static str, message: impl Into<String>) -> Self {
        Self::StoreError {
            operation,
            message: message.into(),
        }
    }

    /// The taxonomy kind this error is reported under
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ConfigurationError { .. } | Self::SharedError(_) => ErrorKind::Configuration,
            Self::ResourceConflict { .. } => ErrorKind::ResourceConflict,
            Self::TaskNotFound { .. } | Self::InstanceNotFound { .. } => ErrorKind::NotFound,
            Self::InvalidState { .. } => ErrorKind::InvalidState,
            Self::BucketNotFound { .. }
            | Self::ProviderError { .. }
            | Self::ProviderTimeout { .. }
            | Self::PartialCreation { .. }
            | Self::JsonError(_) => ErrorKind::Provider,
            Self::StoreError { .. } | Self::StoreTimeout { .. } => ErrorKind::Store,
        }
    }
}

impl From<OrchestratorError> for ApiError {
    fn from(error: OrchestratorError) -> Self {
        ApiError::new(error.kind(), error.to_string())
    }
}

pub type OrchestratorResult<T> = Result<T, OrchestratorError>;
