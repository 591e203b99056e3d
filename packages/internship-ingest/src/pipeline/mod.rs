//! The ingestion pipeline.
//!
//! - `dedupe` - drop in-batch duplicates by url
//! - `existence` - drop listings whose url is already stored
//! - `persist` - chunked batch writes
//! - `orchestrator` - runs the stages and builds the summary
//! - `guard` - one run at a time for in-process schedulers

pub mod context;
pub mod dedupe;
pub mod existence;
pub mod guard;
pub mod orchestrator;
pub mod persist;

pub use context::RunContext;
pub use dedupe::dedupe;
pub use existence::filter_new;
pub use guard::RunGuard;
pub use orchestrator::Ingestion;
pub use persist::persist;
