//! Testing utilities: listing fixtures and a scenario builder.
//!
//! Lets applications and integration tests wire a pipeline over mock
//! providers and an in-memory store without touching a network or database.

use std::sync::Arc;

use crate::pipeline::Ingestion;
use crate::providers::{MockFailure, MockProvider};
use crate::stores::MemoryStore;
use crate::types::{config::IngestConfig, listing::Listing};

/// A listing with a stable id derived from its url.
pub fn listing(source: &str, url: &str) -> Listing {
    Listing::new(source)
        .with_id(format!("{}:{}", source, url))
        .with_title("Intern")
        .with_url(url)
}

/// `count` distinct listings from `source`, urls numbered from `start`.
pub fn numbered_listings(source: &str, start: usize, count: usize) -> Vec<Listing> {
    (start..start + count)
        .map(|n| listing(source, &format!("https://jobs.example.com/{}/{}", source, n)))
        .collect()
}

/// Builder for a pipeline over mock providers and a shared memory store.
///
/// # Example
///
/// ```rust
/// use internship_ingest::testing::{numbered_listings, TestScenario};
///
/// let scenario = TestScenario::new()
///     .with_source("Adzuna", numbered_listings("Adzuna", 0, 3));
/// let store = scenario.store();
/// let ingestion = scenario.build();
/// ```
pub struct TestScenario {
    store: Arc<MemoryStore>,
    providers: Vec<Arc<MockProvider>>,
    config: IngestConfig,
}

impl TestScenario {
    pub fn new() -> Self {
        Self::with_store(Arc::new(MemoryStore::new()))
    }

    /// Start from an existing store, e.g. one shared by two scenarios.
    pub fn with_store(store: Arc<MemoryStore>) -> Self {
        Self {
            store,
            providers: Vec::new(),
            config: IngestConfig::default(),
        }
    }

    /// Add a provider that returns `listings`.
    pub fn with_source(mut self, name: &str, listings: Vec<Listing>) -> Self {
        self.providers
            .push(Arc::new(MockProvider::new(name).with_listings(listings)));
        self
    }

    /// Add a provider that fails with `failure`.
    pub fn with_failing_source(mut self, name: &str, failure: MockFailure) -> Self {
        self.providers
            .push(Arc::new(MockProvider::new(name).failing_with(failure)));
        self
    }

    pub fn with_config(mut self, config: IngestConfig) -> Self {
        self.config = config;
        self
    }

    /// The store the built pipeline writes to.
    pub fn store(&self) -> Arc<MemoryStore> {
        self.store.clone()
    }

    /// The mock providers, in registration order.
    pub fn providers(&self) -> Vec<Arc<MockProvider>> {
        self.providers.clone()
    }

    pub fn build(self) -> Ingestion {
        self.providers.into_iter().fold(
            Ingestion::new(self.store).with_config(self.config),
            |ingestion, provider| ingestion.with_provider(provider),
        )
    }
}

impl Default for TestScenario {
    fn default() -> Self {
        Self::new()
    }
}
