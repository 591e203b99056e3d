//! Internship listing ingestion.
//!
//! Pulls postings from external job boards, normalizes them into a single
//! [`Listing`] shape, drops duplicates within the batch and against the
//! store, and writes what is new in bounded batches.
//!
//! # Usage
//!
//! ```rust,ignore
//! use internship_ingest::{Ingestion, IngestConfig, MemoryStore};
//! use internship_ingest::providers::{AdzunaProvider, AdzunaSettings};
//!
//! let store = Arc::new(MemoryStore::new());
//! let ingestion = Ingestion::new(store)
//!     .with_provider(Arc::new(AdzunaProvider::new(settings)?))
//!     .with_config(IngestConfig::new().with_dry_run(true));
//!
//! let summary = ingestion.run().await;
//! println!("{}", summary);
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Provider and store abstractions
//! - [`types`] - Listing, run configuration and run summary
//! - [`providers`] - Adzuna, Job Bank and mock providers
//! - [`pipeline`] - Dedupe, existence filter, persister, orchestrator
//! - [`stores`] - Storage implementations (MemoryStore, SQLite, Postgres)
//! - [`security`] - Credential handling and bearer token verification
//! - [`config`] - Environment configuration for the binary
//! - [`testing`] - Fixtures and scenario builder for tests
//!
//! # Concurrency
//!
//! The store is the only shared state. Checking a url and writing it are
//! separate steps, so two overlapping runs can both write the same url.
//! Use [`RunGuard`] to keep in-process triggers from overlapping.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod providers;
pub mod security;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{AuthError, SourceError, StoreError};
pub use pipeline::{Ingestion, RunContext, RunGuard};
pub use security::verify_bearer;
pub use stores::MemoryStore;
pub use traits::{provider::SourceProvider, store::ListingStore};
pub use types::{
    config::{IngestConfig, MAX_BATCH_WRITE},
    listing::Listing,
    summary::{
        DedupeStats, FilterStats, PersistReport, RunPhase, RunStatus, RunSummary, SourceOutcome,
        SourceReport,
    },
};

#[cfg(feature = "sqlite")]
pub use stores::SqliteStore;

#[cfg(feature = "postgres")]
pub use stores::PostgresStore;
