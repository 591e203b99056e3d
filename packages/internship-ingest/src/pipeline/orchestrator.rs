//! Ingestion orchestrator: fetch -> dedupe -> filter -> persist.

use std::sync::Arc;

use futures::future::join_all;
use tokio::time::timeout_at;
use tracing::{info, warn};

use crate::error::SourceError;
use crate::pipeline::context::RunContext;
use crate::pipeline::{dedupe::dedupe, existence::filter_new, persist::persist};
use crate::traits::{provider::SourceProvider, store::ListingStore};
use crate::types::{
    config::IngestConfig,
    listing::Listing,
    summary::{PersistReport, RunPhase, RunStatus, RunSummary, SourceReport},
};

/// Longest slice of an error body written to the log.
const MAX_LOGGED_BODY: usize = 2048;

/// One configured ingestion pipeline.
///
/// Holds no state between runs: every call to [`Ingestion::run`] builds a
/// fresh [`RunContext`] and reads everything else from the store.
///
/// # Example
///
/// ```rust,ignore
/// let ingestion = Ingestion::new(store)
///     .with_provider(Arc::new(adzuna))
///     .with_config(IngestConfig::new().with_batch_size(25));
///
/// let summary = ingestion.run().await;
/// println!("{}", summary);
/// ```
pub struct Ingestion {
    providers: Vec<Arc<dyn SourceProvider>>,
    disabled: Vec<SourceReport>,
    store: Arc<dyn ListingStore>,
    config: IngestConfig,
}

impl Ingestion {
    pub fn new(store: Arc<dyn ListingStore>) -> Self {
        Self {
            providers: Vec::new(),
            disabled: Vec::new(),
            store,
            config: IngestConfig::default(),
        }
    }

    pub fn with_config(mut self, config: IngestConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_provider(mut self, provider: Arc<dyn SourceProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    /// Record a source that could not be configured.
    ///
    /// It is reported as disabled in every run and degrades the status.
    pub fn with_disabled(mut self, source: impl Into<String>, reason: impl Into<String>) -> Self {
        self.disabled.push(SourceReport::disabled(source, reason));
        self
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Run the pipeline once and summarize it.
    ///
    /// Never fails: source, lookup and write errors are folded into the
    /// summary's status.
    pub async fn run(&self) -> RunSummary {
        let mut ctx = RunContext::new(self.store.clone(), self.config.clone());
        info!(
            run_id = %ctx.run_id,
            providers = self.providers.len(),
            disabled = self.disabled.len(),
            dry_run = ctx.config.dry_run,
            "Starting ingestion run"
        );

        ctx.advance(RunPhase::Fetching);
        let (fetched, fetch_reports) = self.fetch_all(&ctx).await;

        ctx.advance(RunPhase::Deduplicating);
        let (unique, dedupe_stats) = dedupe(fetched);

        ctx.advance(RunPhase::FilteringExisting);
        let (fresh, filter_stats) = filter_new(&ctx, unique).await;

        let persist_report = if ctx.config.dry_run {
            info!(run_id = %ctx.run_id, would_write = fresh.len(), "Dry run, skipping persistence");
            PersistReport::default()
        } else {
            ctx.advance(RunPhase::Persisting);
            persist(&ctx, &fresh).await
        };

        let mut sources = self.disabled.clone();
        sources.extend(fetch_reports);

        let degraded = sources.iter().any(|s| !s.is_ok())
            || filter_stats.unknown > 0
            || !persist_report.is_complete();
        let status = if degraded {
            RunStatus::PartialFailure
        } else {
            RunStatus::Done
        };
        ctx.advance(status.into());

        let summary = RunSummary {
            run_id: ctx.run_id,
            started_at: ctx.started_at,
            elapsed: ctx.elapsed(),
            sources,
            dedupe: dedupe_stats,
            filter: filter_stats,
            persist: persist_report,
            dry_run: ctx.config.dry_run,
            status,
        };

        info!(
            run_id = %summary.run_id,
            status = %summary.status,
            fetched = summary.total_fetched(),
            after_dedupe = summary.after_dedupe(),
            persisted = summary.persisted(),
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "Ingestion run finished"
        );

        summary
    }

    /// Fetch from every provider concurrently and wait for all of them.
    ///
    /// Listings are concatenated in provider registration order.
    async fn fetch_all(&self, ctx: &RunContext) -> (Vec<Listing>, Vec<SourceReport>) {
        let fetches = self.providers.iter().map(|provider| async move {
            let name = provider.name().to_string();
            let result = match timeout_at(ctx.deadline, provider.fetch()).await {
                Ok(result) => result,
                Err(_) => Err(SourceError::Timeout),
            };

            match result {
                Ok(listings) => {
                    info!(run_id = %ctx.run_id, source = %name, count = listings.len(), "Fetched listings");
                    (SourceReport::ok(name, listings.len()), listings)
                }
                Err(e) => {
                    warn!(
                        run_id = %ctx.run_id,
                        source = %name,
                        error = %e,
                        status = ?e.status(),
                        body = e.body().map(|b| truncate(b, MAX_LOGGED_BODY)).unwrap_or(""),
                        "Source fetch failed, contributing no listings"
                    );
                    (SourceReport::failed(name, e.to_string()), Vec::new())
                }
            }
        });

        let mut all = Vec::new();
        let mut reports = Vec::with_capacity(self.providers.len());
        for (report, listings) in join_all(fetches).await {
            reports.push(report);
            all.extend(listings);
        }
        (all, reports)
    }
}

fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{MockFailure, MockProvider};
    use crate::stores::MemoryStore;
    use crate::types::summary::SourceOutcome;
    use std::time::Duration;

    fn listing(id: &str, url: &str) -> Listing {
        Listing::new("Adzuna").with_id(id).with_url(url)
    }

    #[tokio::test]
    async fn test_clean_run_is_done() {
        let store = Arc::new(MemoryStore::new());
        let provider = MockProvider::new("Adzuna").with_listings(vec![
            listing("1", "https://jobs.example.com/1"),
            listing("2", "https://jobs.example.com/2"),
        ]);

        let summary = Ingestion::new(store.clone())
            .with_provider(Arc::new(provider))
            .run()
            .await;

        assert_eq!(summary.status, RunStatus::Done);
        assert_eq!(summary.total_fetched(), 2);
        assert_eq!(summary.persisted(), 2);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_no_providers_is_an_empty_done_run() {
        let store = Arc::new(MemoryStore::new());
        let summary = Ingestion::new(store).run().await;

        assert_eq!(summary.status, RunStatus::Done);
        assert_eq!(summary.total_fetched(), 0);
        assert_eq!(summary.persisted(), 0);
    }

    #[tokio::test]
    async fn test_disabled_source_degrades_status() {
        let store = Arc::new(MemoryStore::new());
        let summary = Ingestion::new(store)
            .with_provider(Arc::new(
                MockProvider::new("Adzuna").with_listing(listing("1", "https://jobs.example.com/1")),
            ))
            .with_disabled("JobBank", "JOBBANK_API_KEY not set")
            .run()
            .await;

        assert_eq!(summary.status, RunStatus::PartialFailure);
        assert_eq!(summary.persisted(), 1);
        let jobbank = summary.sources.iter().find(|s| s.source == "JobBank").unwrap();
        assert!(matches!(jobbank.outcome, SourceOutcome::Disabled(_)));
    }

    #[tokio::test]
    async fn test_slow_provider_cut_off_by_deadline() {
        let store = Arc::new(MemoryStore::new());
        let slow = MockProvider::new("JobBank")
            .with_listing(listing("s", "https://jobs.example.com/slow"))
            .with_delay(Duration::from_secs(5));

        let summary = Ingestion::new(store.clone())
            .with_provider(Arc::new(slow))
            .with_config(IngestConfig::new().with_run_timeout(Duration::from_millis(50)))
            .run()
            .await;

        assert_eq!(summary.status, RunStatus::PartialFailure);
        assert_eq!(summary.fetched_from("JobBank"), 0);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_failed_chunk_degrades_status() {
        let store = Arc::new(MemoryStore::new());
        store.fail_write_call(1);
        let provider = MockProvider::new("Adzuna")
            .with_listing(listing("1", "https://jobs.example.com/1"));

        let summary = Ingestion::new(store)
            .with_provider(Arc::new(provider))
            .run()
            .await;

        assert_eq!(summary.status, RunStatus::PartialFailure);
        assert_eq!(summary.persist.chunks_failed, 1);
        assert_eq!(summary.persisted(), 0);
    }

    #[tokio::test]
    async fn test_failure_reason_in_summary_text() {
        let store = Arc::new(MemoryStore::new());
        let summary = Ingestion::new(store)
            .with_provider(Arc::new(MockProvider::new("JobBank").failing_with(
                MockFailure::Status {
                    status: 502,
                    body: "<html>bad gateway</html>".into(),
                },
            )))
            .run()
            .await;

        let text = summary.to_string();
        assert!(text.contains("PartialFailure"));
        assert!(text.contains("JobBank: fetched 0 (failed: HTTP 502)"));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("héllo", 2), "h");
        assert_eq!(truncate("abcdef", 3), "abc");
    }
}
