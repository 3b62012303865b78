//! Entry point of the `stork` service
//!
//! Wires the in-process store and fleet provider into the orchestrator
//! and serves the task API over HTTP.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;

use orchestrator::config::{DEFAULT_MIN_POPULATION_SIZE, DEFAULT_YEARS_OF_HISTORY};
use orchestrator::services::{InMemoryTaskStore, InstanceSettings, LocalFleetProvider};
use orchestrator::{FleetOrchestrator, OrchestratorConfig};
use shared::logging::{self, LoggingConfig};
use webserver::WebServer;

/// Batch synthetic patient data generation service
#[derive(Parser, Debug)]
#[command(name = "stork")]
#[command(about = "Runs fleets of Synthea workers that generate synthetic patient records")]
pub struct Args {
    /// Address the HTTP API binds to
    #[arg(long, env = "STORK_HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "STORK_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "STORK_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Log every provider request with its payload
    #[arg(long, env = "STORK_DEBUG")]
    pub debug: bool,

    /// Smallest population a single worker may be given
    #[arg(long, env = "STORK_MIN_POPULATION_SIZE", default_value_t = DEFAULT_MIN_POPULATION_SIZE)]
    pub min_population_size: u32,

    /// Years of patient history each worker simulates
    #[arg(long, env = "STORK_YEARS_OF_HISTORY", default_value_t = DEFAULT_YEARS_OF_HISTORY)]
    pub years_of_history: u32,

    #[arg(long, env = "STORK_BUCKET_REGION", default_value = "us-east-1")]
    pub bucket_region: String,

    /// Public base URL workers use for their done callback
    #[arg(long, env = "STORK_CALLBACK_URL")]
    pub callback_url: Option<String>,

    #[arg(long, env = "STORK_PROVIDER_TIMEOUT_SECS", default_value_t = 30)]
    pub provider_timeout_secs: u64,

    #[arg(long, env = "STORK_STORE_TIMEOUT_SECS", default_value_t = 10)]
    pub store_timeout_secs: u64,

    /// Worker image to launch
    #[arg(long, env = "STORK_SYNTHEA_IMAGE_ID", default_value = "")]
    pub synthea_image_id: String,

    #[arg(long, env = "STORK_SYNTHEA_INSTANCE_TYPE", default_value = "t2.micro")]
    pub synthea_instance_type: String,

    #[arg(long, env = "STORK_SYNTHEA_SECURITY_GROUP_ID", default_value = "")]
    pub synthea_security_group_id: String,

    #[arg(long, env = "STORK_SYNTHEA_ROLE_ARN", default_value = "")]
    pub synthea_role_arn: String,

    #[arg(long, env = "STORK_SYNTHEA_SUBNET_ID", default_value = "subnet-581c7275")]
    pub synthea_subnet_id: String,
}

impl Args {
    fn bind_address(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid bind address {}:{}", self.host, self.port))
    }

    fn orchestrator_config(&self) -> OrchestratorConfig {
        let callback_url = self
            .callback_url
            .clone()
            .unwrap_or_else(|| format!("http://localhost:{}", self.port));

        OrchestratorConfig::new()
            .with_min_population_size(self.min_population_size)
            .with_years_of_history(self.years_of_history)
            .with_bucket_region(self.bucket_region.clone())
            .with_callback_base_url(callback_url)
            .with_provider_timeout(Duration::from_secs(self.provider_timeout_secs))
            .with_store_timeout(Duration::from_secs(self.store_timeout_secs))
            .with_verbose_provider_logging(self.debug)
    }

    fn instance_settings(&self) -> InstanceSettings {
        InstanceSettings {
            image_id: self.synthea_image_id.clone(),
            instance_type: self.synthea_instance_type.clone(),
            security_group_id: self.synthea_security_group_id.clone(),
            role_arn: self.synthea_role_arn.clone(),
            subnet_id: self.synthea_subnet_id.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    dotenv::dotenv().ok();
    let args = Args::parse();

    logging::init_tracing(&LoggingConfig::new(args.log_level.clone()))?;
    logging::log_startup("stork", &format!("task API on {}:{}", args.host, args.port));

    let bind_address = args.bind_address()?;
    let config = args.orchestrator_config();
    tracing::debug!("Orchestrator configuration: {:?}", config);

    let orchestrator = Arc::new(FleetOrchestrator::new(
        config,
        InMemoryTaskStore::new(),
        LocalFleetProvider::with_settings(args.instance_settings()),
    ));

    WebServer::new(bind_address, orchestrator)
        .run()
        .await
        .context("Task API server failed")?;

    logging::log_shutdown("stork", "Received Ctrl+C signal");
    Ok(())
}
