//! Adzuna job search provider.

use std::time::Duration;

use adzuna_client::{AdzunaClient, AdzunaJob, SearchParams, SearchResponse};
use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::{SourceError, SourceResult};
use crate::security::ApiCredentials;
use crate::traits::provider::SourceProvider;
use crate::types::listing::Listing;

/// Provenance tag for Adzuna listings.
pub const ADZUNA_SOURCE: &str = "Adzuna";

/// Settings for [`AdzunaProvider`].
#[derive(Debug, Clone)]
pub struct AdzunaSettings {
    pub credentials: ApiCredentials,
    /// Two-letter country code. Default: `ca`.
    pub country: String,
    /// Search keywords. Default: `intern`.
    pub what: String,
    /// Default: 50.
    pub results_per_page: u32,
    /// Override the API host (stubs, staging).
    pub base_url: Option<String>,
    /// Per-request timeout. Default: 30s.
    pub timeout: Duration,
}

impl AdzunaSettings {
    pub fn new(credentials: ApiCredentials) -> Self {
        Self {
            credentials,
            country: "ca".to_string(),
            what: "intern".to_string(),
            results_per_page: 50,
            base_url: None,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = country.into();
        self
    }

    pub fn with_what(mut self, what: impl Into<String>) -> Self {
        self.what = what.into();
        self
    }

    pub fn with_results_per_page(mut self, n: u32) -> Self {
        self.results_per_page = n;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Fetches one page of Adzuna search results per run.
pub struct AdzunaProvider {
    client: AdzunaClient,
    params: SearchParams,
}

impl AdzunaProvider {
    pub fn new(settings: AdzunaSettings) -> SourceResult<Self> {
        if !settings.credentials.is_complete() {
            return Err(SourceError::MissingCredentials(
                "ADZUNA_API_APP_ID and ADZUNA_API_KEY must both be set".to_string(),
            ));
        }

        let mut client = AdzunaClient::new(
            settings.credentials.app_id.clone(),
            settings.credentials.app_key.expose().to_string(),
        )
        .with_timeout(settings.timeout)?;
        if let Some(base_url) = settings.base_url {
            client = client.with_base_url(base_url);
        }

        let params = SearchParams::new(settings.country, settings.what)
            .with_results_per_page(settings.results_per_page);

        Ok(Self { client, params })
    }
}

#[async_trait]
impl SourceProvider for AdzunaProvider {
    fn name(&self) -> &str {
        ADZUNA_SOURCE
    }

    async fn fetch(&self) -> SourceResult<Vec<Listing>> {
        info!(country = %self.params.country, what = %self.params.what, "Fetching Adzuna listings");
        let response = self.client.search(&self.params).await?;
        debug!(
            results = response.results.len(),
            count = ?response.count,
            "Adzuna search returned"
        );
        Ok(map_search_response(response))
    }
}

/// Map a search response into listings.
pub fn map_search_response(response: SearchResponse) -> Vec<Listing> {
    response.results.into_iter().map(map_job).collect()
}

fn map_job(job: AdzunaJob) -> Listing {
    let display = |d: Option<adzuna_client::DisplayName>| {
        d.and_then(|d| d.display_name).unwrap_or_default()
    };

    Listing::new(ADZUNA_SOURCE)
        .with_source_id(job.id.unwrap_or_default())
        .with_title(job.title.unwrap_or_default())
        .with_company(display(job.company))
        .with_location(display(job.location))
        .with_description(job.description.unwrap_or_default())
        .with_url(job.redirect_url.unwrap_or_default())
        .with_posted_date(job.created.unwrap_or_default())
        .ensure_id()
}
