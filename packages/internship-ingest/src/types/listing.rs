//! The canonical listing record every provider maps into.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A normalized internship/job posting.
///
/// Text fields are never null: providers coerce anything missing to `""`
/// so downstream filtering stays total. `url` is the identity key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Listing {
    /// Opaque identifier, taken from the source or a random UUID
    pub id: String,

    pub title: String,

    pub company: String,

    pub location: String,

    pub description: String,

    /// Canonical identity key
    pub url: String,

    /// Source-reported date, kept verbatim (sources disagree on format)
    pub posted_date: String,

    /// Provenance tag of the provider that produced the record
    pub source: String,
}

impl Listing {
    /// Create an empty listing tagged with its source.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Default::default()
        }
    }

    /// Set the id. Empty ids are replaced by [`Listing::ensure_id`].
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the id from a source-assigned id, namespaced by `source`.
    ///
    /// Boards number their postings independently, so a bare source id can
    /// collide across boards; `Adzuna:41233` and `JobBank:41233` cannot.
    /// A blank id is left empty for [`Listing::ensure_id`].
    pub fn with_source_id(mut self, source_id: impl AsRef<str>) -> Self {
        let source_id = source_id.as_ref().trim();
        self.id = if source_id.is_empty() {
            String::new()
        } else {
            format!("{}:{}", self.source, source_id)
        };
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = company.into();
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_posted_date(mut self, posted_date: impl Into<String>) -> Self {
        self.posted_date = posted_date.into();
        self
    }

    /// Assign a random UUID if the source did not supply an id.
    pub fn ensure_id(mut self) -> Self {
        if self.id.trim().is_empty() {
            self.id = Uuid::new_v4().to_string();
        }
        self
    }

    /// Whether `url` can serve as an identity key.
    pub fn has_identity(&self) -> bool {
        is_identity_url(&self.url)
    }
}

/// A usable identity key is non-empty and starts with `http`.
pub fn is_identity_url(url: &str) -> bool {
    !url.is_empty() && url.starts_with("http")
}
