//! Typed errors for the ingestion library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) so the orchestrator can
//! tell source, store and auth failures apart and degrade accordingly.

use thiserror::Error;

/// Errors raised by a source provider while fetching or mapping postings.
///
/// None of these are fatal to a run: the orchestrator records them against
/// the provider and carries on with the other sources.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Transport failure (DNS, connect, TLS, body read)
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Non-2xx response
    #[error("HTTP {status}")]
    Status { status: u16, body: String },

    /// Response body did not have the expected shape
    #[error("malformed payload: {reason}")]
    Malformed { reason: String, body: String },

    /// Request or run deadline elapsed
    #[error("timed out")]
    Timeout,

    /// App id/key pair not configured
    #[error("missing credentials: {0}")]
    MissingCredentials(String),

    /// Invalid endpoint or query configuration
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl SourceError {
    /// HTTP status code, if the source answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            SourceError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Raw response body, if one was received.
    pub fn body(&self) -> Option<&str> {
        match self {
            SourceError::Status { body, .. } | SourceError::Malformed { body, .. } => Some(body),
            _ => None,
        }
    }
}

impl From<adzuna_client::AdzunaError> for SourceError {
    fn from(err: adzuna_client::AdzunaError) -> Self {
        use adzuna_client::AdzunaError;

        if err.is_timeout() {
            return SourceError::Timeout;
        }
        match err {
            AdzunaError::Api { status, message } => SourceError::Status {
                status,
                body: message,
            },
            AdzunaError::Parse { source, body } => SourceError::Malformed {
                reason: source.to_string(),
                body,
            },
            AdzunaError::Http(e) => SourceError::Http(Box::new(e)),
        }
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SourceError::Timeout
        } else {
            // Provider URLs carry credentials in the query string.
            SourceError::Http(Box::new(err.without_url()))
        }
    }
}

/// Errors raised by a listing store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Could not open or reach the store
    #[error("connection error: {0}")]
    Connection(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Secondary-index lookup failed
    #[error("query failed: {0}")]
    Query(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Batch write failed
    #[error("write failed: {0}")]
    Write(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Caller did not pre-chunk the batch
    #[error("batch of {len} exceeds store limit of {max}")]
    BatchTooLarge { len: usize, max: usize },
}

/// Bearer token verification failures.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing or non-bearer authorization header")]
    MissingBearer,

    #[error("no verification secret configured")]
    MissingSecret,

    #[error("invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error("token has no subject")]
    MissingSubject,
}

/// Result type alias for provider operations.
pub type SourceResult<T> = std::result::Result<T, SourceError>;

/// Result type alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Result type alias for auth operations.
pub type AuthResult<T> = std::result::Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adzuna_api_error_keeps_status_and_body() {
        let err: SourceError = adzuna_client::AdzunaError::Api {
            status: 503,
            message: "upstream busy".into(),
        }
        .into();

        assert_eq!(err.status(), Some(503));
        assert_eq!(err.body(), Some("upstream busy"));
        assert_eq!(err.to_string(), "HTTP 503");
    }

    #[test]
    fn test_adzuna_parse_error_is_malformed() {
        let source = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let err: SourceError = adzuna_client::AdzunaError::Parse {
            source,
            body: "{oops".into(),
        }
        .into();

        assert!(matches!(err, SourceError::Malformed { .. }));
        assert_eq!(err.body(), Some("{oops"));
    }

    #[test]
    fn test_batch_too_large_message() {
        let err = StoreError::BatchTooLarge { len: 30, max: 25 };
        assert_eq!(err.to_string(), "batch of 30 exceeds store limit of 25");
    }
}
