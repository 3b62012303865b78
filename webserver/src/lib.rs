//! HTTP surface of the Stork task service
//!
//! An axum router that maps REST calls onto a [`TaskApi`] implementation.
//! The crate knows nothing about fleets or stores; the orchestrator crate
//! supplies the implementation.

pub mod error;
pub mod state;
pub mod traits;
pub mod webserver_impl;

pub use error::{WebServerError, WebServerResult};
pub use state::WebServerState;
pub use traits::{MockTaskApi, TaskApi};
pub use webserver_impl::WebServer;
