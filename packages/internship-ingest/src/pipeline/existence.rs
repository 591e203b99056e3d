//! Existence filter: drop candidates whose url is already stored.

use futures::stream::{self, StreamExt};
use tokio::time::timeout_at;
use tracing::{debug, warn};

use crate::pipeline::context::RunContext;
use crate::types::{listing::Listing, summary::FilterStats};

enum Verdict {
    New(Listing),
    Present,
    Unknown,
    Invalid,
}

/// Keep only candidates with no stored listing for their url.
///
/// One lookup per candidate, at most `existence_concurrency` in flight,
/// output in input order. A failed lookup, or one the run deadline cuts
/// off, counts as unknown and the candidate is skipped (fail closed).
pub async fn filter_new(ctx: &RunContext, candidates: Vec<Listing>) -> (Vec<Listing>, FilterStats) {
    let concurrency = ctx.config.existence_concurrency.max(1);

    let verdicts: Vec<Verdict> = stream::iter(candidates)
        .map(|listing| check(ctx, listing))
        .buffered(concurrency)
        .collect()
        .await;

    let mut stats = FilterStats::default();
    let mut fresh = Vec::new();
    for verdict in verdicts {
        match verdict {
            Verdict::New(listing) => {
                stats.new += 1;
                fresh.push(listing);
            }
            Verdict::Present => stats.already_present += 1,
            Verdict::Unknown => stats.unknown += 1,
            Verdict::Invalid => stats.invalid += 1,
        }
    }
    stats.checked = stats.new + stats.already_present + stats.unknown;

    debug!(
        run_id = %ctx.run_id,
        checked = stats.checked,
        new = stats.new,
        present = stats.already_present,
        unknown = stats.unknown,
        "Existence filter done"
    );

    (fresh, stats)
}

async fn check(ctx: &RunContext, listing: Listing) -> Verdict {
    if !listing.has_identity() {
        return Verdict::Invalid;
    }
    if ctx.deadline_passed() {
        return Verdict::Unknown;
    }

    match timeout_at(ctx.deadline, ctx.store.lookup_by_url(&listing.url)).await {
        Ok(Ok(false)) => Verdict::New(listing),
        Ok(Ok(true)) => Verdict::Present,
        Ok(Err(e)) => {
            warn!(run_id = %ctx.run_id, url = %listing.url, error = %e, "Existence lookup failed, skipping");
            Verdict::Unknown
        }
        Err(_) => {
            warn!(run_id = %ctx.run_id, url = %listing.url, "Existence lookup hit run deadline, skipping");
            Verdict::Unknown
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::MemoryStore;
    use crate::types::config::IngestConfig;
    use std::sync::Arc;
    use std::time::Duration;

    fn listing(id: &str, url: &str) -> Listing {
        Listing::new("Adzuna").with_id(id).with_url(url)
    }

    fn ctx_with(store: Arc<MemoryStore>, config: IngestConfig) -> RunContext {
        RunContext::new(store, config)
    }

    #[tokio::test]
    async fn test_filters_stored_urls_and_keeps_order() {
        let store = Arc::new(
            MemoryStore::new().with_listings(vec![listing("old", "https://jobs.example.com/2")]),
        );
        let ctx = ctx_with(store, IngestConfig::new().with_existence_concurrency(3));

        let (fresh, stats) = filter_new(
            &ctx,
            vec![
                listing("a", "https://jobs.example.com/1"),
                listing("b", "https://jobs.example.com/2"),
                listing("c", "https://jobs.example.com/3"),
                listing("d", "https://jobs.example.com/4"),
            ],
        )
        .await;

        let ids: Vec<&str> = fresh.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c", "d"]);
        assert_eq!(stats.new, 3);
        assert_eq!(stats.already_present, 1);
        assert_eq!(stats.checked, 4);
    }

    #[tokio::test]
    async fn test_lookup_failure_fails_closed() {
        let store = Arc::new(MemoryStore::new());
        store.fail_lookup_for("https://jobs.example.com/bad");
        let ctx = ctx_with(store, IngestConfig::new());

        let (fresh, stats) = filter_new(
            &ctx,
            vec![
                listing("a", "https://jobs.example.com/bad"),
                listing("b", "https://jobs.example.com/good"),
            ],
        )
        .await;

        assert_eq!(fresh.len(), 1);
        assert_eq!(fresh[0].id, "b");
        assert_eq!(stats.unknown, 1);
    }

    #[tokio::test]
    async fn test_invalid_urls_never_looked_up() {
        let store = Arc::new(MemoryStore::new());
        let ctx = ctx_with(store.clone(), IngestConfig::new());

        let (fresh, stats) = filter_new(&ctx, vec![listing("a", ""), listing("b", "www.x.com")]).await;

        assert!(fresh.is_empty());
        assert_eq!(stats.invalid, 2);
        assert_eq!(store.lookup_count(), 0);
    }

    #[tokio::test]
    async fn test_passed_deadline_marks_unknown() {
        let store = Arc::new(MemoryStore::new());
        let ctx = ctx_with(store.clone(), IngestConfig::new().with_run_timeout(Duration::ZERO));

        let (fresh, stats) = filter_new(&ctx, vec![listing("a", "https://jobs.example.com/1")]).await;

        assert!(fresh.is_empty());
        assert_eq!(stats.unknown, 1);
        assert_eq!(store.lookup_count(), 0);
    }
}
