//! Source provider implementations.
//!
//! Available providers:
//! - `AdzunaProvider` - Adzuna job search API
//! - `JobBankProvider` - Job Bank JSON feed
//! - `MockProvider` - Canned responses for tests and dry runs

pub mod adzuna;
pub mod jobbank;
pub mod mock;

pub use adzuna::{map_search_response, AdzunaProvider, AdzunaSettings, ADZUNA_SOURCE};
pub use jobbank::{map_payload, JobBankProvider, JobBankSettings, JOBBANK_SOURCE};
pub use mock::{MockFailure, MockProvider};
