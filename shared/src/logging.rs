//! Shared logging utilities for consistent tracing across the service
//!
//! Verbosity is an explicit [`LoggingConfig`] value handed to
//! [`init_tracing`] at startup. Nothing here keeps a mutable global level.

use chrono::{DateTime, Utc};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::errors::{SharedError, SharedResult};

/// Logging configuration for one process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Base level for our own crates: trace, debug, info, warn or error
    pub level: String,
    /// Extra `target=level` directives appended to the filter
    pub extra_directives: Vec<String>,
}

impl LoggingConfig {
    pub fn new(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            extra_directives: Vec::new(),
        }
    }

    /// Add a `target=level` directive (fluent API)
    pub fn with_directive(mut self, directive: impl Into<String>) -> Self {
        self.extra_directives.push(directive.into());
        self
    }

    /// Build the filter string handed to `EnvFilter`
    pub fn filter_string(&self) -> String {
        let base = &self.level;
        let mut filter =
            format!("orchestrator={base},webserver={base},shared={base},stork={base},tower_http=info,axum=warn,hyper=warn");
        for directive in &self.extra_directives {
            filter.push(',');
            filter.push_str(directive);
        }
        filter
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::new("info")
    }
}

/// Initialize the stdout tracing subscriber.
///
/// A subscriber installed earlier (e.g. by a test harness) is left in place.
pub fn init_tracing(config: &LoggingConfig) -> SharedResult<()> {
    let filter_string = config.filter_string();
    let env_filter = EnvFilter::try_new(&filter_string).map_err(|_| SharedError::InvalidLogFilter {
        filter: filter_string.clone(),
    })?;

    let installed = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();

    if installed.is_ok() {
        info!("📊 Log filter: {filter_string}");
    }
    Ok(())
}

/// Get formatted timestamp for consistent logging
pub fn format_timestamp() -> String {
    let now: DateTime<Utc> = Utc::now();
    now.format("%H:%M:%S%.3f").to_string()
}

/// Macro for task-scoped info logging
#[macro_export]
macro_rules! task_info {
    ($task_id:expr, $($arg:tt)*) => {
        tracing::info!(
            task = %$task_id,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Macro for task-scoped warning logging
#[macro_export]
macro_rules! task_warn {
    ($task_id:expr, $($arg:tt)*) => {
        tracing::warn!(
            task = %$task_id,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Macro for task-scoped error logging
#[macro_export]
macro_rules! task_error {
    ($task_id:expr, $($arg:tt)*) => {
        tracing::error!(
            task = %$task_id,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Macro for task-scoped debug logging
#[macro_export]
macro_rules! task_debug {
    ($task_id:expr, $($arg:tt)*) => {
        tracing::debug!(
            task = %$task_id,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Contextual logging helper for startup messages
pub fn log_startup(component: &str, details: &str) {
    info!(
        component = component,
        timestamp = format_timestamp(),
        "🚀 Starting {}",
        details
    );
}

/// Contextual logging helper for shutdown messages
pub fn log_shutdown(component: &str, reason: &str) {
    info!(
        component = component,
        timestamp = format_timestamp(),
        "🛑 Shutting down: {}",
        reason
    );
}

/// Contextual logging helper for error conditions
pub fn log_error(component: &str, context: &str, error: &dyn std::fmt::Display) {
    error!(
        component = component,
        timestamp = format_timestamp(),
        error = %error,
        "❌ {} failed: {}",
        context,
        error
    );
}
