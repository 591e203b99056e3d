//! Mock provider for testing.
//!
//! Returns canned listings or a canned failure, optionally after a delay,
//! and counts how often it was called.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use crate::error::{SourceError, SourceResult};
use crate::traits::provider::SourceProvider;
use crate::types::listing::Listing;

/// Failure a [`MockProvider`] reports instead of its listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockFailure {
    Timeout,
    Status { status: u16, body: String },
    Malformed(String),
}

impl From<&MockFailure> for SourceError {
    fn from(failure: &MockFailure) -> Self {
        match failure {
            MockFailure::Timeout => SourceError::Timeout,
            MockFailure::Status { status, body } => SourceError::Status {
                status: *status,
                body: body.clone(),
            },
            MockFailure::Malformed(body) => SourceError::Malformed {
                reason: "unexpected payload".to_string(),
                body: body.clone(),
            },
        }
    }
}

/// Mock provider for testing.
///
/// # Example
///
/// ```rust
/// use internship_ingest::providers::MockProvider;
/// use internship_ingest::Listing;
///
/// let mock = MockProvider::new("Adzuna")
///     .with_listing(Listing::new("Adzuna").with_url("https://jobs.example.com/1"));
/// assert_eq!(mock.call_count(), 0);
/// ```
pub struct MockProvider {
    name: String,
    listings: RwLock<Vec<Listing>>,
    failure: RwLock<Option<MockFailure>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl MockProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            listings: RwLock::new(Vec::new()),
            failure: RwLock::new(None),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Add a listing returned by every fetch (builder pattern).
    pub fn with_listing(self, listing: Listing) -> Self {
        self.add_listings(vec![listing]);
        self
    }

    /// Add listings returned by every fetch (builder pattern).
    pub fn with_listings(self, listings: Vec<Listing>) -> Self {
        self.add_listings(listings);
        self
    }

    /// Fail every fetch with `failure` (builder pattern).
    pub fn failing_with(self, failure: MockFailure) -> Self {
        self.set_failure(Some(failure));
        self
    }

    /// Sleep before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn add_listings(&self, listings: Vec<Listing>) {
        self.listings
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(listings);
    }

    /// Set or clear the canned failure.
    pub fn set_failure(&self, failure: Option<MockFailure>) {
        *self.failure.write().unwrap_or_else(PoisonError::into_inner) = failure;
    }

    /// Number of times `fetch` was called.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SourceProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> SourceResult<Vec<Listing>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(failure) = self
            .failure
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            return Err(failure.into());
        }

        Ok(self
            .listings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_returns_canned_listings() {
        let mock = MockProvider::new("Adzuna")
            .with_listing(Listing::new("Adzuna").with_url("https://jobs.example.com/1"));

        let listings = mock.fetch().await.unwrap();
        assert_eq!(listings.len(), 1);
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_canned_failure() {
        let mock = MockProvider::new("JobBank").failing_with(MockFailure::Status {
            status: 503,
            body: "maintenance".into(),
        });

        let err = mock.fetch().await.unwrap_err();
        assert_eq!(err.status(), Some(503));
        assert_eq!(err.body(), Some("maintenance"));

        mock.set_failure(None);
        assert!(mock.fetch().await.unwrap().is_empty());
        assert_eq!(mock.call_count(), 2);
    }
}
