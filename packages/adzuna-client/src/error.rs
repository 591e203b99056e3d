use thiserror::Error;

/// Errors returned by [`crate::AdzunaClient`].
#[derive(Debug, Error)]
pub enum AdzunaError {
    /// Transport-level failure (DNS, connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-2xx status.
    #[error("Adzuna API returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The body was not the JSON shape we expect.
    #[error("malformed Adzuna response: {source}")]
    Parse {
        #[source]
        source: serde_json::Error,
        body: String,
    },
}

impl AdzunaError {
    /// HTTP status code, when the API answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            AdzunaError::Api { status, .. } => Some(*status),
            AdzunaError::Http(e) => e.status().map(|s| s.as_u16()),
            AdzunaError::Parse { .. } => None,
        }
    }

    /// Raw response body, when one was received.
    pub fn body(&self) -> Option<&str> {
        match self {
            AdzunaError::Api { message, .. } => Some(message),
            AdzunaError::Parse { body, .. } => Some(body),
            AdzunaError::Http(_) => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, AdzunaError::Http(e) if e.is_timeout())
    }
}

pub type Result<T> = std::result::Result<T, AdzunaError>;
