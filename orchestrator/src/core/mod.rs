//! Core business logic modules
//!
//! This module contains pure task logic with no adapter I/O.

pub mod locks;
pub mod partition;
pub mod state_machine;
pub mod validator;

pub use locks::{TaskGuard, TaskLocks};
pub use partition::{partition, Partition, PartitionError};
pub use state_machine::{InvalidTransition, TaskEvent, TaskTransition};
pub use validator::{check_worker_config, validate, ValidationFailure};
