//! Orchestrator configuration
//!
//! Everything the orchestrator needs is passed in through
//! [`OrchestratorConfig`]; the binary builds it from command line
//! arguments and environment variables.

use std::time::Duration;

use shared::TaskId;

/// Default floor on a single worker's population share
pub const DEFAULT_MIN_POPULATION_SIZE: u32 = 500;

pub const DEFAULT_YEARS_OF_HISTORY: u32 = 5;

/// Settings that shape task creation and adapter calls
#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorConfig {
    /// Smallest population share a worker may be given
    pub min_population_size: u32,

    /// Region the output buckets live in
    pub bucket_region: String,

    /// Public base URL workers use to reach this service
    pub callback_base_url: String,

    /// Route template of the done callback; `:id` is replaced with the task id
    pub done_endpoint: String,

    /// Years of synthetic history each worker generates
    pub years_of_history: u32,

    /// Upper bound on any single fleet provider call
    pub provider_timeout: Duration,

    /// Upper bound on any single task store call
    pub store_timeout: Duration,

    /// Log every provider request with its payload at info level
    pub verbose_provider_logging: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            min_population_size: DEFAULT_MIN_POPULATION_SIZE,
            bucket_region: "us-east-1".to_string(),
            callback_base_url: "http://localhost:8080".to_string(),
            done_endpoint: "/task/:id/done".to_string(),
            years_of_history: DEFAULT_YEARS_OF_HISTORY,
            provider_timeout: Duration::from_secs(30),
            store_timeout: Duration::from_secs(10),
            verbose_provider_logging: false,
        }
    }
}

impl OrchestratorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min_population_size(mut self, min_population_size: u32) -> Self {
        self.min_population_size = min_population_size;
        self
    }

    pub fn with_bucket_region(mut self, bucket_region: impl Into<String>) -> Self {
        self.bucket_region = bucket_region.into();
        self
    }

    pub fn with_callback_base_url(mut self, callback_base_url: impl Into<String>) -> Self {
        self.callback_base_url = callback_base_url.into();
        self
    }

    pub fn with_years_of_history(mut self, years_of_history: u32) -> Self {
        self.years_of_history = years_of_history;
        self
    }

    pub fn with_provider_timeout(mut self, provider_timeout: Duration) -> Self {
        self.provider_timeout = provider_timeout;
        self
    }

    pub fn with_store_timeout(mut self, store_timeout: Duration) -> Self {
        self.store_timeout = store_timeout;
        self
    }

    pub fn with_verbose_provider_logging(mut self, verbose: bool) -> Self {
        self.verbose_provider_logging = verbose;
        self
    }

    /// Full URL a worker of `task_id` pings when done
    pub fn done_url(&self, task_id: &TaskId) -> String {
        let path = self.done_endpoint.replace(":id", task_id.as_str());
        format!("{}{}", self.callback_base_url.trim_end_matches('/'), path)
    }
}
