//! In-memory listing store for testing and development.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};

use crate::error::{StoreError, StoreResult};
use crate::traits::store::ListingStore;
use crate::types::{config::MAX_BATCH_WRITE, listing::Listing};

/// In-memory listings keyed by `id`.
///
/// Useful for tests and dry runs. Data is lost on restart. Lookups by url
/// scan the map, which stands in for the secondary index.
///
/// Failures can be injected per url (lookups) or per write call so tests
/// can exercise fail-closed filtering and partial persistence.
pub struct MemoryStore {
    listings: RwLock<HashMap<String, Listing>>,
    failing_lookups: RwLock<HashSet<String>>,
    failing_writes: RwLock<HashSet<usize>>,
    write_sizes: RwLock<Vec<usize>>,
    lookup_calls: AtomicUsize,
    max_batch_size: usize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create a new empty store with the standard batch limit.
    pub fn new() -> Self {
        Self {
            listings: RwLock::new(HashMap::new()),
            failing_lookups: RwLock::new(HashSet::new()),
            failing_writes: RwLock::new(HashSet::new()),
            write_sizes: RwLock::new(Vec::new()),
            lookup_calls: AtomicUsize::new(0),
            max_batch_size: MAX_BATCH_WRITE,
        }
    }

    /// Override the batch-write limit.
    pub fn with_max_batch_size(mut self, max: usize) -> Self {
        self.max_batch_size = max.max(1);
        self
    }

    /// Seed the store with existing listings (bypasses write accounting).
    pub fn with_listings(self, listings: impl IntoIterator<Item = Listing>) -> Self {
        {
            let mut map = self.listings.write().unwrap_or_else(PoisonError::into_inner);
            for listing in listings {
                map.insert(listing.id.clone(), listing);
            }
        }
        self
    }

    /// Make every lookup for `url` fail.
    pub fn fail_lookup_for(&self, url: impl Into<String>) {
        self.failing_lookups
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(url.into());
    }

    /// Make the `n`-th batch write (1-based, counted over the store's
    /// lifetime) fail.
    pub fn fail_write_call(&self, n: usize) {
        self.failing_writes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(n);
    }

    /// Number of stored listings.
    pub fn len(&self) -> usize {
        self.listings.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All stored listings, in no particular order.
    pub fn listings(&self) -> Vec<Listing> {
        self.listings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }

    /// Stored listings carrying `url`.
    pub fn listings_with_url(&self, url: &str) -> Vec<Listing> {
        self.listings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|l| l.url == url)
            .cloned()
            .collect()
    }

    /// Sizes of every batch write attempted, in call order.
    pub fn write_sizes(&self) -> Vec<usize> {
        self.write_sizes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of url lookups served.
    pub fn lookup_count(&self) -> usize {
        self.lookup_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ListingStore for MemoryStore {
    async fn lookup_by_url(&self, url: &str) -> StoreResult<bool> {
        self.lookup_calls.fetch_add(1, Ordering::SeqCst);

        if self
            .failing_lookups
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(url)
        {
            return Err(StoreError::Query(
                format!("injected lookup failure for {}", url).into(),
            ));
        }

        Ok(self
            .listings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .any(|l| l.url == url))
    }

    async fn batch_write(&self, listings: &[Listing]) -> StoreResult<()> {
        if listings.len() > self.max_batch_size {
            return Err(StoreError::BatchTooLarge {
                len: listings.len(),
                max: self.max_batch_size,
            });
        }

        let call = {
            let mut sizes = self.write_sizes.write().unwrap_or_else(PoisonError::into_inner);
            sizes.push(listings.len());
            sizes.len()
        };

        if self
            .failing_writes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&call)
        {
            return Err(StoreError::Write(
                format!("injected failure on write call {}", call).into(),
            ));
        }

        let mut map = self.listings.write().unwrap_or_else(PoisonError::into_inner);
        for listing in listings {
            map.insert(listing.id.clone(), listing.clone());
        }
        Ok(())
    }

    fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(id: &str, url: &str) -> Listing {
        Listing::new("test").with_id(id).with_url(url)
    }

    #[tokio::test]
    async fn test_write_then_lookup() {
        let store = MemoryStore::new();
        store
            .batch_write(&[listing("1", "https://a.example/1")])
            .await
            .unwrap();

        assert!(store.lookup_by_url("https://a.example/1").await.unwrap());
        assert!(!store.lookup_by_url("https://a.example/2").await.unwrap());
        assert_eq!(store.lookup_count(), 2);
    }

    #[tokio::test]
    async fn test_upsert_overwrites_by_id() {
        let store = MemoryStore::new();
        store
            .batch_write(&[listing("1", "https://a.example/1").with_title("old")])
            .await
            .unwrap();
        store
            .batch_write(&[listing("1", "https://a.example/1").with_title("new")])
            .await
            .unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.listings()[0].title, "new");
    }

    #[tokio::test]
    async fn test_rejects_oversized_batch() {
        let store = MemoryStore::new().with_max_batch_size(2);
        let batch = vec![
            listing("1", "https://a.example/1"),
            listing("2", "https://a.example/2"),
            listing("3", "https://a.example/3"),
        ];

        let err = store.batch_write(&batch).await.unwrap_err();
        assert!(matches!(err, StoreError::BatchTooLarge { len: 3, max: 2 }));
        assert!(store.is_empty());
        assert!(store.write_sizes().is_empty());
    }

    #[tokio::test]
    async fn test_injected_failures() {
        let store = MemoryStore::new();
        store.fail_lookup_for("https://a.example/bad");
        store.fail_write_call(2);

        assert!(store.lookup_by_url("https://a.example/bad").await.is_err());

        store
            .batch_write(&[listing("1", "https://a.example/1")])
            .await
            .unwrap();
        assert!(store
            .batch_write(&[listing("2", "https://a.example/2")])
            .await
            .is_err());
        assert_eq!(store.len(), 1);
        assert_eq!(store.write_sizes(), vec![1, 1]);
    }
}
