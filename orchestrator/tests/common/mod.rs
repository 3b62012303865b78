//! Common test utilities and infrastructure
//!
//! Shared fixtures and builders used by the unit (mock) and integration
//! (in-memory services) suites.

#![allow(dead_code)]

pub mod fixtures;
pub mod helpers;

// Re-export commonly used items for convenience
pub use fixtures::TestFixtures;
pub use helpers::{OrchestratorBuilder, TestHelpers};
