use serde::{Deserialize, Deserializer};

/// Query parameters for `GET /v1/api/jobs/{country}/search/{page}`.
#[derive(Debug, Clone)]
pub struct SearchParams {
    /// Two-letter country code (`ca`, `gb`, `us`, ...).
    pub country: String,
    pub page: u32,
    /// Free-text keywords (`what=`).
    pub what: String,
    /// Optional location filter (`where=`).
    pub location: Option<String>,
    pub results_per_page: u32,
}

impl SearchParams {
    pub fn new(country: impl Into<String>, what: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            page: 1,
            what: what.into(),
            location: None,
            results_per_page: 50,
        }
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_results_per_page(mut self, n: u32) -> Self {
        self.results_per_page = n;
        self
    }
}

impl Default for SearchParams {
    fn default() -> Self {
        Self::new("ca", "intern")
    }
}

/// Top-level search response. Only the fields we consume are modelled.
///
/// Entries of `results` that are not job objects are skipped, so one bad
/// advert never costs the rest of the page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default, deserialize_with = "lenient_jobs")]
    pub results: Vec<AdzunaJob>,
    #[serde(default)]
    pub count: Option<u64>,
}

/// A single job advert from the `results` array.
///
/// Every field is optional; scalar fields accept strings, numbers or null
/// because the API is inconsistent about `id` in particular.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdzunaJob {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_display_name")]
    pub company: Option<DisplayName>,
    #[serde(default, deserialize_with = "lenient_display_name")]
    pub location: Option<DisplayName>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub redirect_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub created: Option<String>,
}

/// `{"display_name": "..."}` wrapper used for company and location.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DisplayName {
    #[serde(default, deserialize_with = "lenient_string")]
    pub display_name: Option<String>,
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        Some(serde_json::Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// Objects decode as `DisplayName`; any other shape is `None`.
fn lenient_display_name<'de, D>(deserializer: D) -> std::result::Result<Option<DisplayName>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(v @ serde_json::Value::Object(_)) => serde_json::from_value(v).ok(),
        _ => None,
    })
}

fn lenient_jobs<'de, D>(deserializer: D) -> std::result::Result<Vec<AdzunaJob>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?;
    Ok(values
        .unwrap_or_default()
        .into_iter()
        .filter(serde_json::Value::is_object)
        .filter_map(|v| serde_json::from_value(v).ok())
        .collect())
}
