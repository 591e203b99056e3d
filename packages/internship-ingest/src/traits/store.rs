//! Listing store trait.
//!
//! The store is the only state shared between runs. It offers exactly the
//! two operations ingestion needs:
//! - `lookup_by_url`: point query on the secondary `url` index
//! - `batch_write`: upsert of up to `max_batch_size()` listings by `id`
//!
//! There is no conditional write: two runs that both see a url as absent
//! will both write it.

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::types::{config::MAX_BATCH_WRITE, listing::Listing};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListingStore: Send + Sync {
    /// Whether any stored listing has exactly this url.
    async fn lookup_by_url(&self, url: &str) -> StoreResult<bool>;

    /// Upsert a batch of listings.
    ///
    /// Must reject batches larger than `max_batch_size()` with
    /// `StoreError::BatchTooLarge`; callers pre-chunk.
    async fn batch_write(&self, listings: &[Listing]) -> StoreResult<()>;

    /// Largest batch `batch_write` accepts.
    fn max_batch_size(&self) -> usize {
        MAX_BATCH_WRITE
    }
}
