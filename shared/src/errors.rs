//! Shared error types for the task orchestration system

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SharedError {
    #[error("Unknown output format: {input}")]
    InvalidFormat { input: String },

    #[error("Unknown task status: {input}")]
    InvalidStatus { input: String },

    #[error("Invalid log filter: {filter}")]
    InvalidLogFilter { filter: String },
}

pub type SharedResult<T> = Result<T, SharedError>;

/// Classification every failed operation is reported under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Invalid population, worker count or field; caller must correct input
    Configuration,
    /// Bucket name collision
    ResourceConflict,
    /// Unknown task or instance
    NotFound,
    /// Operation illegal for the task's current status
    InvalidState,
    /// Cloud provider call failed or timed out
    Provider,
    /// Persistence call failed or timed out
    Store,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Configuration => "configuration error",
            Self::ResourceConflict => "resource conflict",
            Self::NotFound => "not found",
            Self::InvalidState => "invalid state",
            Self::Provider => "provider error",
            Self::Store => "store error",
        };
        f.write_str(name)
    }
}

/// Error crossing the API boundary: a kind plus a human readable message
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct ApiError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ApiError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
