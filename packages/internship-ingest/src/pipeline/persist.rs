//! Batch persister: write new listings in store-sized chunks.

use tracing::{debug, info, warn};

use crate::pipeline::context::RunContext;
use crate::types::{listing::Listing, summary::PersistReport};

/// Write `listings` in chunks of `min(batch_size, store.max_batch_size())`.
///
/// Chunks are independent: a failed chunk is reported and the next one is
/// still attempted. Nothing is retried or rolled back. Once the run
/// deadline has passed, remaining chunks are skipped.
pub async fn persist(ctx: &RunContext, listings: &[Listing]) -> PersistReport {
    let mut report = PersistReport::default();
    if listings.is_empty() {
        return report;
    }

    let chunk_size = ctx
        .config
        .batch_size
        .min(ctx.store.max_batch_size())
        .max(1);
    let chunks: Vec<&[Listing]> = listings.chunks(chunk_size).collect();
    let total = chunks.len();

    for (i, chunk) in chunks.iter().enumerate() {
        if ctx.deadline_passed() {
            let remaining = &chunks[i..];
            report.chunks_skipped = remaining.len();
            report
                .failed_items
                .extend(remaining.iter().flat_map(|c| c.iter().map(|l| l.id.clone())));
            warn!(
                run_id = %ctx.run_id,
                skipped = report.chunks_skipped,
                "Run deadline passed, skipping remaining chunks"
            );
            break;
        }

        match ctx.store.batch_write(chunk).await {
            Ok(()) => {
                report.written += chunk.len();
                report.chunks_ok += 1;
                debug!(run_id = %ctx.run_id, chunk = i + 1, total, size = chunk.len(), "Chunk written");
            }
            Err(e) => {
                report.chunks_failed += 1;
                report.failed_items.extend(chunk.iter().map(|l| l.id.clone()));
                warn!(
                    run_id = %ctx.run_id,
                    chunk = i + 1,
                    total,
                    size = chunk.len(),
                    error = %e,
                    "Chunk write failed"
                );
            }
        }
    }

    info!(
        run_id = %ctx.run_id,
        written = report.written,
        chunks_ok = report.chunks_ok,
        chunks_failed = report.chunks_failed,
        chunks_skipped = report.chunks_skipped,
        "Persisted new listings"
    );

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::stores::MemoryStore;
    use crate::traits::store::MockListingStore;
    use crate::types::config::IngestConfig;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn listings(n: usize) -> Vec<Listing> {
        (0..n)
            .map(|i| {
                Listing::new("Adzuna")
                    .with_id(format!("id-{}", i))
                    .with_url(format!("https://jobs.example.com/{}", i))
            })
            .collect()
    }

    #[tokio::test]
    async fn test_53_listings_make_three_calls() {
        let sizes = Arc::new(Mutex::new(Vec::new()));
        let recorded = sizes.clone();

        let mut store = MockListingStore::new();
        store.expect_max_batch_size().return_const(25usize);
        store
            .expect_batch_write()
            .times(3)
            .returning(move |batch| {
                recorded.lock().unwrap().push(batch.len());
                Ok(())
            });

        let ctx = RunContext::new(Arc::new(store), IngestConfig::new());
        let report = persist(&ctx, &listings(53)).await;

        assert_eq!(*sizes.lock().unwrap(), vec![25, 25, 3]);
        assert_eq!(report.written, 53);
        assert_eq!(report.chunks_ok, 3);
        assert!(report.is_complete());
    }

    #[tokio::test]
    async fn test_smaller_configured_batch_wins() {
        let store = Arc::new(MemoryStore::new());
        let ctx = RunContext::new(store.clone(), IngestConfig::new().with_batch_size(10));

        let report = persist(&ctx, &listings(23)).await;

        assert_eq!(store.write_sizes(), vec![10, 10, 3]);
        assert_eq!(report.written, 23);
    }

    #[tokio::test]
    async fn test_store_limit_caps_configured_batch() {
        let store = Arc::new(MemoryStore::new().with_max_batch_size(5));
        let ctx = RunContext::new(store.clone(), IngestConfig::new().with_batch_size(100));

        persist(&ctx, &listings(12)).await;

        assert_eq!(store.write_sizes(), vec![5, 5, 2]);
    }

    #[tokio::test]
    async fn test_failed_chunk_does_not_stop_the_rest() {
        let mut store = MockListingStore::new();
        store.expect_max_batch_size().return_const(25usize);
        let mut call = 0;
        store.expect_batch_write().times(3).returning(move |_| {
            call += 1;
            if call == 2 {
                Err(StoreError::Write("throttled".into()))
            } else {
                Ok(())
            }
        });

        let ctx = RunContext::new(Arc::new(store), IngestConfig::new());
        let input = listings(60);
        let report = persist(&ctx, &input).await;

        assert_eq!(report.written, 35);
        assert_eq!(report.chunks_ok, 2);
        assert_eq!(report.chunks_failed, 1);
        assert_eq!(report.failed_items.len(), 25);
        assert_eq!(report.failed_items[0], "id-25");
        assert!(!report.is_complete());
    }

    #[tokio::test]
    async fn test_deadline_skips_all_chunks() {
        let store = Arc::new(MemoryStore::new());
        let ctx = RunContext::new(
            store.clone(),
            IngestConfig::new().with_run_timeout(Duration::ZERO),
        );

        let report = persist(&ctx, &listings(30)).await;

        assert_eq!(report.written, 0);
        assert_eq!(report.chunks_skipped, 2);
        assert_eq!(report.failed_items.len(), 30);
        assert!(store.write_sizes().is_empty());
    }

    #[tokio::test]
    async fn test_empty_input_writes_nothing() {
        let store = Arc::new(MemoryStore::new());
        let ctx = RunContext::new(store.clone(), IngestConfig::new());

        let report = persist(&ctx, &[]).await;

        assert_eq!(report, PersistReport::default());
        assert!(store.write_sizes().is_empty());
    }
}
