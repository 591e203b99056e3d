//! Domain types for ingestion.

pub mod config;
pub mod listing;
pub mod summary;
