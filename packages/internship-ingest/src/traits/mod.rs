//! Core trait abstractions for the ingestion library.
//!
//! Applications implement these to plug in job boards and storage.

pub mod provider;
pub mod store;
