//! Per-run state owned by the orchestrator.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::traits::store::ListingStore;
use crate::types::{config::IngestConfig, summary::RunPhase};

/// Deadline used when `run_timeout` is too large to add to the clock.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// State scoped to a single run.
///
/// Created when a run starts, handed by reference to each stage and
/// dropped when the summary is returned. Nothing in it outlives the run.
pub struct RunContext {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    /// Overall deadline, `run_timeout` after start, clamped when that overflows
    pub deadline: Instant,
    pub store: Arc<dyn ListingStore>,
    pub config: IngestConfig,
    started: Instant,
    phase: RunPhase,
}

impl RunContext {
    pub fn new(store: Arc<dyn ListingStore>, config: IngestConfig) -> Self {
        let started = Instant::now();
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            deadline: started
                .checked_add(config.run_timeout)
                .or_else(|| started.checked_add(FAR_FUTURE))
                .unwrap_or(started),
            store,
            config,
            started,
            phase: RunPhase::Idle,
        }
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// Move to the next phase.
    ///
    /// Illegal transitions are logged and ignored.
    pub fn advance(&mut self, next: RunPhase) {
        if self.phase.can_advance_to(next) {
            if next.is_terminal() {
                info!(run_id = %self.run_id, from = ?self.phase, elapsed = ?self.elapsed(), "Run finished");
            } else {
                debug!(run_id = %self.run_id, from = ?self.phase, to = ?next, "Run phase");
            }
            self.phase = next;
        } else {
            warn!(run_id = %self.run_id, from = ?self.phase, to = ?next, "Ignoring illegal phase transition");
        }
    }

    pub fn deadline_passed(&self) -> bool {
        Instant::now() >= self.deadline
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::MemoryStore;

    fn ctx(timeout: Duration) -> RunContext {
        RunContext::new(
            Arc::new(MemoryStore::new()),
            IngestConfig::new().with_run_timeout(timeout),
        )
    }

    #[tokio::test]
    async fn test_advance_follows_state_machine() {
        let mut ctx = ctx(Duration::from_secs(60));
        assert_eq!(ctx.phase(), RunPhase::Idle);

        ctx.advance(RunPhase::Persisting);
        assert_eq!(ctx.phase(), RunPhase::Idle);

        ctx.advance(RunPhase::Fetching);
        ctx.advance(RunPhase::Deduplicating);
        assert_eq!(ctx.phase(), RunPhase::Deduplicating);
    }

    #[tokio::test]
    async fn test_deadline() {
        assert!(!ctx(Duration::from_secs(60)).deadline_passed());
        assert!(ctx(Duration::ZERO).deadline_passed());
    }

    #[tokio::test]
    async fn test_huge_timeout_clamps_deadline() {
        let ctx = ctx(Duration::MAX);
        assert!(!ctx.deadline_passed());
        assert!(ctx.deadline > Instant::now() + Duration::from_secs(86_400 * 365));
    }

    #[tokio::test]
    async fn test_terminal_phase_reached() {
        let mut ctx = ctx(Duration::from_secs(60));
        for phase in [
            RunPhase::Fetching,
            RunPhase::Deduplicating,
            RunPhase::FilteringExisting,
            RunPhase::Done,
        ] {
            ctx.advance(phase);
        }
        assert!(ctx.phase().is_terminal());

        ctx.advance(RunPhase::Fetching);
        assert_eq!(ctx.phase(), RunPhase::Done);
    }
}
