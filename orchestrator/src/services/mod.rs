//! Service implementations
//!
//! In-process implementations of the adapter traits. They back the
//! `stork` binary in local mode and the integration tests.

pub mod fleet_provider;
pub mod task_store;

pub use fleet_provider::{FleetOperation, InstanceSettings, LocalFleetProvider};
pub use task_store::InMemoryTaskStore;

#[cfg(test)]
mod tests;
