//! Source provider trait.
//!
//! One implementation per external job board. A provider makes one call to
//! its API, maps the response into [`Listing`]s and returns them. It never
//! retries: the next scheduled run is the retry.
//!
//! ```rust,ignore
//! let listings = provider.fetch().await?;
//! tracing::info!(source = provider.name(), count = listings.len(), "fetched");
//! ```

use async_trait::async_trait;

use crate::error::SourceResult;
use crate::types::listing::Listing;

#[async_trait]
pub trait SourceProvider: Send + Sync {
    /// Provenance tag written into every listing this provider produces.
    fn name(&self) -> &str;

    /// Fetch and map one batch of postings.
    ///
    /// Individual postings with missing fields are still returned (with
    /// empty strings); only a failure of the call as a whole is an error.
    async fn fetch(&self) -> SourceResult<Vec<Listing>>;
}
