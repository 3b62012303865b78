//! Equal partitioning of a population across a worker fleet

use std::fmt;

/// How a population is split across workers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition {
    pub workers: u32,
    /// Population given to every worker
    pub share: u32,
    /// Records dropped by integer division; never redistributed
    pub remainder: u64,
}

impl Partition {
    /// Records actually generated across the fleet
    pub fn total(&self) -> u64 {
        u64::from(self.workers) * u64::from(self.share)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartitionError {
    NoWorkers { requested: i64 },
    TooManyWorkers { requested: i64 },
    NegativePopulation { population: i64 },
    ShareTooSmall { share: i64, minimum: u32 },
    ShareTooLarge { share: i64 },
}

impl fmt::Display for PartitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoWorkers { requested } => write!(f, "number of instances must be positive, got {requested}"),
            Self::TooManyWorkers { requested } => write!(f, "number of instances {requested} is too large"),
            Self::NegativePopulation { population } => write!(f, "population must not be negative, got {population}"),
            Self::ShareTooSmall { share, minimum } => write!(
                f,
                "population per instance would be {share}, below the minimum of {minimum}"
            ),
            Self::ShareTooLarge { share } => write!(f, "population per instance {share} is too large"),
        }
    }
}

/// Split `population` equally across `workers`, dropping any remainder
pub fn partition(population: i64, workers: i64, min_share: u32) -> Result<Partition, PartitionError> {
    if workers <= 0 {
        return Err(PartitionError::NoWorkers { requested: workers });
    }
    let worker_count = u32::try_from(workers).map_err(|_| PartitionError::TooManyWorkers { requested: workers })?;

    if population < 0 {
        return Err(PartitionError::NegativePopulation { population });
    }

    let share = population / workers;
    if share < i64::from(min_share) {
        return Err(PartitionError::ShareTooSmall {
            share,
            minimum: min_share,
        });
    }
    let share_u32 = u32::try_from(share).map_err(|_| PartitionError::ShareTooLarge { share })?;

    Ok(Partition {
        workers: worker_count,
        share: share_u32,
        remainder: (population % workers) as u64,
    })
}
