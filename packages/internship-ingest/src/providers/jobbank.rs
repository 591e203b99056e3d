//! Job Bank provider.
//!
//! The feed has drifted between field names over time, so the response is
//! walked as an untyped JSON tree instead of a fixed struct. Each field
//! accepts every spelling seen in the wild and falls back to `""`.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

use crate::error::{SourceError, SourceResult};
use crate::security::ApiCredentials;
use crate::traits::provider::SourceProvider;
use crate::types::listing::Listing;

/// Provenance tag for Job Bank listings.
pub const JOBBANK_SOURCE: &str = "JobBank";

/// Settings for [`JobBankProvider`].
#[derive(Debug, Clone)]
pub struct JobBankSettings {
    pub api_url: String,
    pub credentials: ApiCredentials,
    /// Default: `intern`.
    pub keyword: String,
    /// Two-letter province code, all provinces when unset.
    pub province: Option<String>,
    /// Default: 50.
    pub page_size: u32,
    /// Per-request timeout. Default: 30s.
    pub timeout: Duration,
}

impl JobBankSettings {
    pub fn new(api_url: impl Into<String>, credentials: ApiCredentials) -> Self {
        Self {
            api_url: api_url.into(),
            credentials,
            keyword: "intern".to_string(),
            province: None,
            page_size: 50,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = keyword.into();
        self
    }

    pub fn with_province(mut self, province: impl Into<String>) -> Self {
        self.province = Some(province.into());
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Fetches one page of Job Bank postings per run.
pub struct JobBankProvider {
    client: reqwest::Client,
    endpoint: Url,
    settings: JobBankSettings,
}

impl JobBankProvider {
    pub fn new(settings: JobBankSettings) -> SourceResult<Self> {
        if !settings.credentials.is_complete() {
            return Err(SourceError::MissingCredentials(
                "JOBBANK_APP_ID and JOBBANK_API_KEY must both be set".to_string(),
            ));
        }

        let endpoint = Url::parse(&settings.api_url)
            .map_err(|e| SourceError::Config(format!("JOBBANK_API_URL: {}", e)))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(SourceError::Config(format!(
                "JOBBANK_API_URL must be http(s), got {}",
                endpoint.scheme()
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()?;

        Ok(Self {
            client,
            endpoint,
            settings,
        })
    }

    fn request_url(&self) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("keyword", &self.settings.keyword)
                .append_pair("page_size", &self.settings.page_size.to_string())
                .append_pair("app_id", &self.settings.credentials.app_id)
                .append_pair("app_key", self.settings.credentials.app_key.expose());
            if let Some(province) = &self.settings.province {
                query.append_pair("province", province);
            }
        }
        url
    }
}

#[async_trait]
impl SourceProvider for JobBankProvider {
    fn name(&self) -> &str {
        JOBBANK_SOURCE
    }

    async fn fetch(&self) -> SourceResult<Vec<Listing>> {
        info!(
            keyword = %self.settings.keyword,
            province = ?self.settings.province,
            "Fetching Job Bank listings"
        );

        let response = self
            .client
            .get(self.request_url())
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload: Value = serde_json::from_str(&body).map_err(|e| SourceError::Malformed {
            reason: e.to_string(),
            body: body.clone(),
        })?;

        let listings = map_payload(&payload).map_err(|e| match e {
            SourceError::Malformed { reason, .. } => SourceError::Malformed { reason, body },
            other => other,
        })?;
        debug!(count = listings.len(), "Job Bank payload mapped");
        Ok(listings)
    }
}

/// Map a Job Bank response body into listings.
///
/// The body must be an object carrying a `jobs` or `results` array;
/// anything else is malformed. Non-object array entries are skipped.
pub fn map_payload(payload: &Value) -> SourceResult<Vec<Listing>> {
    let jobs = payload
        .get("jobs")
        .or_else(|| payload.get("results"))
        .and_then(Value::as_array)
        .ok_or_else(|| SourceError::Malformed {
            reason: "expected a `jobs` or `results` array".to_string(),
            body: String::new(),
        })?;

    Ok(jobs.iter().filter(|j| j.is_object()).map(map_job).collect())
}

fn map_job(job: &Value) -> Listing {
    Listing::new(JOBBANK_SOURCE)
        .with_source_id(first_text(job, &["jobId", "id"]))
        .with_title(first_text(job, &["title"]))
        .with_company(employer(job))
        .with_location(location(job))
        .with_description(first_text(job, &["description"]))
        .with_url(first_text(job, &["url", "jobUrl"]))
        .with_posted_date(first_text(job, &["datePosted", "postedDate"]))
        .ensure_id()
}

/// Scalar as text: strings verbatim, numbers and bools stringified.
fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn first_text(job: &Value, keys: &[&str]) -> String {
    keys.iter()
        .filter_map(|k| job.get(*k).and_then(text))
        .find(|s| !s.is_empty())
        .unwrap_or_default()
}

fn employer(job: &Value) -> String {
    ["employer", "company"]
        .iter()
        .filter_map(|k| job.get(*k))
        .filter_map(|v| match v {
            Value::Object(_) => v.get("name").and_then(text),
            other => text(other),
        })
        .find(|s| !s.is_empty())
        .unwrap_or_default()
}

fn location(job: &Value) -> String {
    match job.get("location") {
        Some(loc @ Value::Object(_)) => ["city", "province"]
            .iter()
            .filter_map(|k| loc.get(*k).and_then(text))
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        Some(other) => text(other).unwrap_or_default(),
        None => String::new(),
    }
}
