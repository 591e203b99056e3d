//! Configuration for an ingestion run.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Largest batch a store write accepts.
pub const MAX_BATCH_WRITE: usize = 25;

/// Knobs for one run of the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Items per batch-write call.
    ///
    /// Capped at the store's own limit when chunking. Default: 25.
    pub batch_size: usize,

    /// Existence lookups in flight at once. Default: 8.
    pub existence_concurrency: usize,

    /// Overall deadline for the run.
    ///
    /// Providers still fetching when it passes count as failed, and
    /// persistence stops before the next chunk. Default: 300s.
    #[serde(with = "duration_secs")]
    pub run_timeout: Duration,

    /// Fetch, dedupe and filter but write nothing.
    ///
    /// Default: false.
    pub dry_run: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            batch_size: MAX_BATCH_WRITE,
            existence_concurrency: 8,
            run_timeout: Duration::from_secs(300),
            dry_run: false,
        }
    }
}

impl IngestConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the batch-write size (at least 1).
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Set existence lookup concurrency (at least 1).
    pub fn with_existence_concurrency(mut self, concurrency: usize) -> Self {
        self.existence_concurrency = concurrency.max(1);
        self
    }

    /// Set the run deadline.
    pub fn with_run_timeout(mut self, timeout: Duration) -> Self {
        self.run_timeout = timeout;
        self
    }

    /// Enable or disable dry-run mode.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(d)?))
    }
}
