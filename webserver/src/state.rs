//! Webserver state management

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Process-level facts the router reports on `/health`
#[derive(Debug)]
pub struct WebServerState {
    pub bind_address: SocketAddr,
    pub server_start_time: Instant,
}

impl WebServerState {
    pub fn new(bind_address: SocketAddr) -> Self {
        Self {
            bind_address,
            server_start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn get_uptime_seconds(&self) -> u64 {
        self.server_start_time.elapsed().as_secs()
    }
}

/// Router state: the task API plus server facts
pub struct AppState<T: ?Sized> {
    pub api: Arc<T>,
    pub server: Arc<WebServerState>,
}

// Manual impl: `T` itself need not be Clone
impl<T: ?Sized> Clone for AppState<T> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            server: self.server.clone(),
        }
    }
}
