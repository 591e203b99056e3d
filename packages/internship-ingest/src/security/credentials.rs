//! Credential handling with secure memory.
//!
//! Uses the `secrecy` crate to prevent accidental logging of API keys.

use secrecy::{ExposeSecret, SecretBox};
use std::fmt;

/// A secret string that won't be logged or displayed.
pub struct SecretString(SecretBox<str>);

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretBox::new(Box::from(value.into().as_str())))
    }

    /// Expose the secret value for use.
    ///
    /// Only call this when actually building a request.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    pub fn is_empty(&self) -> bool {
        self.expose().is_empty()
    }
}

impl Clone for SecretString {
    fn clone(&self) -> Self {
        Self::new(self.expose().to_string())
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// The app id / key pair job boards hand out.
///
/// The id is not secret (it shows up in dashboards); the key is.
#[derive(Clone)]
pub struct ApiCredentials {
    pub app_id: String,
    pub app_key: SecretString,
}

impl ApiCredentials {
    pub fn new(app_id: impl Into<String>, app_key: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            app_key: SecretString::new(app_key),
        }
    }

    /// Whether both the id and the key are non-blank.
    pub fn is_complete(&self) -> bool {
        !self.app_id.trim().is_empty() && !self.app_key.is_empty()
    }

    /// Build from optional parts; `None` unless both are present and non-blank.
    pub fn from_parts(app_id: Option<String>, app_key: Option<String>) -> Option<Self> {
        match (app_id, app_key) {
            (Some(id), Some(key)) if !id.trim().is_empty() && !key.trim().is_empty() => {
                Some(Self::new(id.trim(), key.trim()))
            }
            _ => None,
        }
    }
}

impl fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("app_id", &self.app_id)
            .field("app_key", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_not_in_debug_or_display() {
        let secret = SecretString::new("adz-super-secret-key");
        assert!(!format!("{:?}", secret).contains("adz-super"));
        assert!(!format!("{}", secret).contains("adz-super"));
        assert_eq!(secret.expose(), "adz-super-secret-key");
    }

    #[test]
    fn test_credentials_debug() {
        let creds = ApiCredentials::new("app-123", "key-secret");
        let debug = format!("{:?}", creds);
        assert!(!debug.contains("key-secret"));
        assert!(debug.contains("app-123"));
    }

    #[test]
    fn test_is_complete() {
        assert!(ApiCredentials::new("id", "key").is_complete());
        assert!(!ApiCredentials::new("id", "").is_complete());
        assert!(!ApiCredentials::new(" ", "key").is_complete());
    }

    #[test]
    fn test_from_parts_requires_both() {
        assert!(ApiCredentials::from_parts(Some("id".into()), Some("key".into())).is_some());
        assert!(ApiCredentials::from_parts(Some("id".into()), None).is_none());
        assert!(ApiCredentials::from_parts(None, Some("key".into())).is_none());
        assert!(ApiCredentials::from_parts(Some("  ".into()), Some("key".into())).is_none());
    }
}
