//! Shared types for the Stork task orchestration system
//!
//! Contains the task record, worker configuration, HTTP message bodies and
//! the error-kind taxonomy used by both the orchestrator and the webserver.

pub mod errors;
pub mod logging;
pub mod messages;
pub mod types;

pub use errors::*;
pub use types::*;

pub use messages::{
    // Operator ↔ API
    CreateTaskRequest, TaskAck, ErrorResponse, TaskList, TaskStatusResponse,

    // Worker → API
    DoneNotification,
};
