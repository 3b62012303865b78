//! Message types exchanged over HTTP
//!
//! - `api`: operator requests and responses for the task API
//! - `callback`: the payload a worker sends when its partition is written

pub mod api;
pub mod callback;

pub use api::{
    format_elapsed, CreateTaskRequest, TaskAck, ErrorResponse, TaskList, TaskStatusResponse,
};
pub use callback::DoneNotification;
