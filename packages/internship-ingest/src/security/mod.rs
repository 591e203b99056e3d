//! Credential handling and token verification.

pub mod credentials;
pub mod token;

pub use credentials::{ApiCredentials, SecretString};
pub use token::verify_bearer;
