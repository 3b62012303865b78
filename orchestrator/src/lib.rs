//! Stork task orchestration library
//!
//! Turns a request for N synthetic patients into a fleet of worker
//! instances, tracks their completion pings and tears the fleet down on
//! abort. Cloud and persistence access sit behind the [`TaskStore`] and
//! [`FleetProvider`] traits so the core can be tested with mocks.

pub mod api;
pub mod config;
pub mod core;
pub mod error;
pub mod orchestrator;
pub mod services;
pub mod traits;

// Re-export commonly used types
pub use config::OrchestratorConfig;
pub use error::{OrchestratorError, OrchestratorResult};
pub use orchestrator::{FleetOrchestrator, TaskReport};
pub use traits::{FleetProvider, MockFleetProvider, MockTaskStore, TaskStore};
