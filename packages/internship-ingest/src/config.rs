//! Environment configuration for the `ingest-run` binary.
//!
//! A missing credential pair disables that source for every run (reported
//! in the summary); a malformed number is a startup error.

use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use dotenvy::dotenv;
use tracing::{error, info, warn};

use crate::error::SourceError;
use crate::pipeline::Ingestion;
use crate::providers::{
    AdzunaProvider, AdzunaSettings, JobBankProvider, JobBankSettings, ADZUNA_SOURCE,
    JOBBANK_SOURCE,
};
use crate::security::ApiCredentials;
use crate::stores::MemoryStore;
use crate::traits::store::ListingStore;
use crate::types::config::IngestConfig;

/// A source that is either configured or disabled with a reason.
#[derive(Debug, Clone)]
pub enum SourceSetting<T> {
    Enabled(T),
    Disabled(String),
}

impl<T> SourceSetting<T> {
    pub fn is_enabled(&self) -> bool {
        matches!(self, SourceSetting::Enabled(_))
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub adzuna: SourceSetting<AdzunaSettings>,
    pub jobbank: SourceSetting<JobBankSettings>,
    /// `postgres://...` or `sqlite:...`; in-memory store when unset
    pub database_url: Option<String>,
    pub ingest: IngestConfig,
    pub http_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let http_timeout = Duration::from_secs(parse_or(&var, "HTTP_TIMEOUT_SECS", 30u64)?);

        let adzuna = match ApiCredentials::from_parts(var("ADZUNA_API_APP_ID"), var("ADZUNA_API_KEY")) {
            Some(credentials) => SourceSetting::Enabled(
                AdzunaSettings::new(credentials)
                    .with_country(var("ADZUNA_COUNTRY").unwrap_or_else(|| "ca".to_string()))
                    .with_what(var("ADZUNA_WHAT").unwrap_or_else(|| "intern".to_string()))
                    .with_results_per_page(parse_or(&var, "ADZUNA_RESULTS_PER_PAGE", 50u32)?)
                    .with_timeout(http_timeout),
            ),
            None => SourceSetting::Disabled(
                SourceError::MissingCredentials(
                    "ADZUNA_API_APP_ID and ADZUNA_API_KEY must both be set".to_string(),
                )
                .to_string(),
            ),
        };

        let jobbank_credentials =
            ApiCredentials::from_parts(var("JOBBANK_APP_ID"), var("JOBBANK_API_KEY"));
        let jobbank = match (var("JOBBANK_API_URL"), jobbank_credentials) {
            (Some(api_url), Some(credentials)) => {
                let mut settings = JobBankSettings::new(api_url, credentials)
                    .with_keyword(var("JOBBANK_KEYWORD").unwrap_or_else(|| "intern".to_string()))
                    .with_timeout(http_timeout);
                if let Some(province) = var("JOBBANK_PROVINCE") {
                    settings = settings.with_province(province);
                }
                SourceSetting::Enabled(settings)
            }
            (None, _) => SourceSetting::Disabled("JOBBANK_API_URL not set".to_string()),
            (Some(_), None) => SourceSetting::Disabled(
                SourceError::MissingCredentials(
                    "JOBBANK_APP_ID and JOBBANK_API_KEY must both be set".to_string(),
                )
                .to_string(),
            ),
        };

        let defaults = IngestConfig::default();
        let ingest = IngestConfig::new()
            .with_batch_size(parse_or(&var, "INGEST_BATCH_SIZE", defaults.batch_size)?)
            .with_existence_concurrency(parse_or(
                &var,
                "INGEST_EXISTENCE_CONCURRENCY",
                defaults.existence_concurrency,
            )?)
            .with_run_timeout(Duration::from_secs(parse_or(
                &var,
                "INGEST_RUN_TIMEOUT_SECS",
                defaults.run_timeout.as_secs(),
            )?));

        Ok(Self {
            adzuna,
            jobbank,
            database_url: var("DATABASE_URL"),
            ingest,
            http_timeout,
        })
    }

    /// Open the listing store named by `DATABASE_URL`.
    pub async fn open_store(&self) -> Result<Arc<dyn ListingStore>> {
        let Some(url) = self.database_url.as_deref() else {
            warn!("DATABASE_URL not set, using in-memory store (nothing survives this process)");
            return Ok(Arc::new(MemoryStore::new()));
        };

        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            return open_postgres(url).await;
        }
        if url.starts_with("sqlite:") {
            return open_sqlite(url).await;
        }
        bail!("DATABASE_URL must be a postgres:// or sqlite: url")
    }

    /// Wire the configured providers into a pipeline over `store`.
    ///
    /// Sources that are disabled, or whose provider cannot be built, are
    /// recorded as disabled instead.
    pub fn build_ingestion(&self, store: Arc<dyn ListingStore>) -> Ingestion {
        let mut ingestion = Ingestion::new(store).with_config(self.ingest.clone());

        match &self.adzuna {
            SourceSetting::Enabled(settings) => match AdzunaProvider::new(settings.clone()) {
                Ok(provider) => ingestion = ingestion.with_provider(Arc::new(provider)),
                Err(e) => {
                    error!(source = ADZUNA_SOURCE, error = %e, "Could not build provider");
                    ingestion = ingestion.with_disabled(ADZUNA_SOURCE, e.to_string());
                }
            },
            SourceSetting::Disabled(reason) => {
                warn!(source = ADZUNA_SOURCE, reason = %reason, "Source disabled");
                ingestion = ingestion.with_disabled(ADZUNA_SOURCE, reason.clone());
            }
        }

        match &self.jobbank {
            SourceSetting::Enabled(settings) => match JobBankProvider::new(settings.clone()) {
                Ok(provider) => ingestion = ingestion.with_provider(Arc::new(provider)),
                Err(e) => {
                    error!(source = JOBBANK_SOURCE, error = %e, "Could not build provider");
                    ingestion = ingestion.with_disabled(JOBBANK_SOURCE, e.to_string());
                }
            },
            SourceSetting::Disabled(reason) => {
                warn!(source = JOBBANK_SOURCE, reason = %reason, "Source disabled");
                ingestion = ingestion.with_disabled(JOBBANK_SOURCE, reason.clone());
            }
        }

        info!(
            batch_size = ingestion.config().batch_size,
            run_timeout_secs = ingestion.config().run_timeout.as_secs(),
            "Ingestion configured"
        );
        ingestion
    }
}

fn parse_or<T, F>(var: &F, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| anyhow::anyhow!("{}", e))
            .with_context(|| format!("{} must be a valid number, got {:?}", key, raw)),
        None => Ok(default),
    }
}

#[cfg(feature = "postgres")]
async fn open_postgres(url: &str) -> Result<Arc<dyn ListingStore>> {
    let store = crate::stores::PostgresStore::new(url)
        .await
        .context("Failed to connect to Postgres")?;
    info!("Using Postgres listing store");
    Ok(Arc::new(store))
}

#[cfg(not(feature = "postgres"))]
async fn open_postgres(_url: &str) -> Result<Arc<dyn ListingStore>> {
    bail!("DATABASE_URL is a Postgres url but the `postgres` feature is disabled")
}

#[cfg(feature = "sqlite")]
async fn open_sqlite(url: &str) -> Result<Arc<dyn ListingStore>> {
    let store = crate::stores::SqliteStore::new(url)
        .await
        .context("Failed to open SQLite database")?;
    info!("Using SQLite listing store");
    Ok(Arc::new(store))
}

#[cfg(not(feature = "sqlite"))]
async fn open_sqlite(_url: &str) -> Result<Arc<dyn ListingStore>> {
    bail!("DATABASE_URL is a SQLite url but the `sqlite` feature is disabled")
}
