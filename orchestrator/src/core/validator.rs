//! Worker configuration validation
//!
//! Rules are enumerated field by field. A config that fails here never
//! reaches the fleet provider.

use shared::WorkerConfig;
use std::fmt;

/// First rule a worker config broke
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationFailure {
    EmptyField(&'static str),
    NoFormats,
    PopulationTooSmall { population: u32, minimum: u32 },
    NoHistory,
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyField(field) => write!(f, "worker config field '{field}' is empty"),
            Self::NoFormats => write!(f, "worker config requests no output formats"),
            Self::PopulationTooSmall { population, minimum } => write!(
                f,
                "worker population {population} is below the minimum of {minimum}"
            ),
            Self::NoHistory => write!(f, "worker config requests zero years of history"),
        }
    }
}

/// Check a worker config, reporting the first broken rule
pub fn check_worker_config(config: &WorkerConfig, min_population: u32) -> Result<(), ValidationFailure> {
    let string_fields = [
        ("taskId", config.task_id.as_str()),
        ("bucketName", config.bucket_name.as_str()),
        ("bucketRegion", config.bucket_region.as_str()),
        ("doneEndpoint", config.done_endpoint.as_str()),
    ];
    if let Some((field, _)) = string_fields.iter().find(|(_, value)| value.trim().is_empty()) {
        return Err(ValidationFailure::EmptyField(*field));
    }

    if config.formats.is_empty() {
        return Err(ValidationFailure::NoFormats);
    }

    // Inclusive floor
    if config.population < min_population {
        return Err(ValidationFailure::PopulationTooSmall {
            population: config.population,
            minimum: min_population,
        });
    }

    if config.years_of_history == 0 {
        return Err(ValidationFailure::NoHistory);
    }

    Ok(())
}

/// Whether a worker config is complete and meets the population floor
pub fn validate(config: &WorkerConfig, min_population: u32) -> bool {
    check_worker_config(config, min_population).is_ok()
}
