//! Run phases, per-stage reports and the run summary.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Orchestrator state machine.
///
/// `Idle -> Fetching -> Deduplicating -> FilteringExisting -> Persisting ->
/// Done | PartialFailure`. A dry run goes straight from `FilteringExisting`
/// to a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunPhase {
    Idle,
    Fetching,
    Deduplicating,
    FilteringExisting,
    Persisting,
    Done,
    PartialFailure,
}

impl RunPhase {
    /// Whether `next` is a legal successor of `self`.
    pub fn can_advance_to(self, next: RunPhase) -> bool {
        use RunPhase::*;
        matches!(
            (self, next),
            (Idle, Fetching)
                | (Fetching, Deduplicating)
                | (Deduplicating, FilteringExisting)
                | (FilteringExisting, Persisting)
                | (FilteringExisting, Done)
                | (FilteringExisting, PartialFailure)
                | (Persisting, Done)
                | (Persisting, PartialFailure)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, RunPhase::Done | RunPhase::PartialFailure)
    }
}

/// Final status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunStatus {
    Done,
    PartialFailure,
}

impl From<RunStatus> for RunPhase {
    fn from(status: RunStatus) -> Self {
        match status {
            RunStatus::Done => RunPhase::Done,
            RunStatus::PartialFailure => RunPhase::PartialFailure,
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::Done => f.write_str("Done"),
            RunStatus::PartialFailure => f.write_str("PartialFailure"),
        }
    }
}

/// How one source fared in a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SourceOutcome {
    Ok,
    Failed(String),
    /// Not configured for this run (e.g. missing credentials)
    Disabled(String),
}

/// Per-source fetch report.
#[derive(Debug, Clone, Serialize)]
pub struct SourceReport {
    pub source: String,
    pub fetched: usize,
    pub outcome: SourceOutcome,
}

impl SourceReport {
    pub fn ok(source: impl Into<String>, fetched: usize) -> Self {
        Self {
            source: source.into(),
            fetched,
            outcome: SourceOutcome::Ok,
        }
    }

    pub fn failed(source: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            fetched: 0,
            outcome: SourceOutcome::Failed(reason.into()),
        }
    }

    pub fn disabled(source: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            fetched: 0,
            outcome: SourceOutcome::Disabled(reason.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.outcome == SourceOutcome::Ok
    }
}

/// Counts from the in-batch deduplicator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DedupeStats {
    pub input: usize,
    pub dropped_invalid: usize,
    pub dropped_duplicate: usize,
    pub output: usize,
}

/// Counts from the existence filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FilterStats {
    pub checked: usize,
    pub new: usize,
    pub already_present: usize,
    /// Lookup failed or deadline passed; skipped (fail closed)
    pub unknown: usize,
    pub invalid: usize,
}

/// Outcome of the batch persister.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PersistReport {
    pub written: usize,
    pub chunks_ok: usize,
    pub chunks_failed: usize,
    /// Chunks never attempted because the run deadline passed
    pub chunks_skipped: usize,
    /// Ids of listings in failed or skipped chunks
    pub failed_items: Vec<String>,
}

impl PersistReport {
    pub fn is_complete(&self) -> bool {
        self.chunks_failed == 0 && self.chunks_skipped == 0
    }
}

/// Everything a run reports back to its trigger.
///
/// `Display` renders the plain-text summary the entry point logs and
/// returns.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    #[serde(skip)]
    pub elapsed: Duration,
    pub sources: Vec<SourceReport>,
    pub dedupe: DedupeStats,
    pub filter: FilterStats,
    pub persist: PersistReport,
    pub dry_run: bool,
    pub status: RunStatus,
}

impl RunSummary {
    pub fn total_fetched(&self) -> usize {
        self.sources.iter().map(|s| s.fetched).sum()
    }

    /// Fetched count for a source, 0 if it is unknown.
    pub fn fetched_from(&self, source: &str) -> usize {
        self.sources
            .iter()
            .find(|s| s.source == source)
            .map(|s| s.fetched)
            .unwrap_or(0)
    }

    pub fn after_dedupe(&self) -> usize {
        self.dedupe.output
    }

    pub fn persisted(&self) -> usize {
        self.persist.written
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Ingestion run {} finished with status {} in {:.1}s{}",
            self.run_id,
            self.status,
            self.elapsed.as_secs_f64(),
            if self.dry_run { " (dry run)" } else { "" }
        )?;
        for source in &self.sources {
            match &source.outcome {
                SourceOutcome::Ok => {
                    writeln!(f, "  {}: fetched {}", source.source, source.fetched)?
                }
                SourceOutcome::Failed(reason) => writeln!(
                    f,
                    "  {}: fetched {} (failed: {})",
                    source.source, source.fetched, reason
                )?,
                SourceOutcome::Disabled(reason) => {
                    writeln!(f, "  {}: disabled ({})", source.source, reason)?
                }
            }
        }
        writeln!(
            f,
            "  total fetched {}, after dedup {} ({} duplicate, {} without url)",
            self.total_fetched(),
            self.dedupe.output,
            self.dedupe.dropped_duplicate,
            self.dedupe.dropped_invalid
        )?;
        writeln!(
            f,
            "  new {}, already stored {}, existence unknown {}",
            self.filter.new, self.filter.already_present, self.filter.unknown
        )?;
        write!(
            f,
            "  persisted {} (chunks ok {}, failed {}, skipped {})",
            self.persist.written,
            self.persist.chunks_ok,
            self.persist.chunks_failed,
            self.persist.chunks_skipped
        )
    }
}
