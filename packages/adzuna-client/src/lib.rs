//! Pure Adzuna REST API client.
//!
//! A minimal client for the Adzuna job search API. Supports a single search
//! page request with app id/key authentication.
//!
//! # Example
//!
//! ```rust,ignore
//! use adzuna_client::{AdzunaClient, SearchParams};
//!
//! let client = AdzunaClient::new("app-id".into(), "app-key".into());
//!
//! let page = client.search(&SearchParams::new("ca", "intern")).await?;
//! for job in &page.results {
//!     println!("{}", job.title.as_deref().unwrap_or("(untitled)"));
//! }
//! ```

pub mod error;
pub mod types;

pub use error::{AdzunaError, Result};
pub use types::{AdzunaJob, DisplayName, SearchParams, SearchResponse};

use std::time::Duration;

const BASE_URL: &str = "https://api.adzuna.com";

pub struct AdzunaClient {
    client: reqwest::Client,
    base_url: String,
    app_id: String,
    app_key: String,
}

impl AdzunaClient {
    pub fn new(app_id: String, app_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: BASE_URL.to_string(),
            app_id,
            app_key,
        }
    }

    /// Point the client at a different host (staging, local stub).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Replace the HTTP client, e.g. to set a request timeout.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Build a client with a per-request timeout.
    pub fn with_timeout(self, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(AdzunaError::Http)?;
        Ok(self.with_client(client))
    }

    fn search_url(&self, params: &SearchParams) -> String {
        format!(
            "{}/v1/api/jobs/{}/search/{}",
            self.base_url, params.country, params.page
        )
    }

    /// Fetch one page of search results.
    ///
    /// Non-2xx responses and undecodable bodies are returned as errors that
    /// carry the raw body, so callers can log what the API actually said.
    pub async fn search(&self, params: &SearchParams) -> Result<SearchResponse> {
        let url = self.search_url(params);
        let results_per_page = params.results_per_page.to_string();

        let mut query: Vec<(&str, &str)> = vec![
            ("app_id", self.app_id.as_str()),
            ("app_key", self.app_key.as_str()),
            ("what", params.what.as_str()),
            ("results_per_page", results_per_page.as_str()),
            ("content-type", "application/json"),
        ];
        if let Some(location) = params.location.as_deref() {
            query.push(("where", location));
        }

        tracing::debug!(country = %params.country, page = params.page, what = %params.what, "Adzuna search");

        // The query string carries app_key, so strip URLs from transport errors.
        let resp = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .query(&query)
            .send()
            .await
            .map_err(|e| AdzunaError::Http(e.without_url()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| AdzunaError::Http(e.without_url()))?;

        tracing::debug!(status = status.as_u16(), bytes = body.len(), "Adzuna response received");

        if !status.is_success() {
            return Err(AdzunaError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        serde_json::from_str(&body).map_err(|source| AdzunaError::Parse { source, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_url() {
        let client = AdzunaClient::new("id".into(), "key".into())
            .with_base_url("http://localhost:9000/");
        let params = SearchParams::new("gb", "intern").with_page(3);
        assert_eq!(
            client.search_url(&params),
            "http://localhost:9000/v1/api/jobs/gb/search/3"
        );
    }

    #[test]
    fn test_default_params() {
        let params = SearchParams::default();
        assert_eq!(params.country, "ca");
        assert_eq!(params.what, "intern");
        assert_eq!(params.page, 1);
        assert_eq!(params.results_per_page, 50);
    }

    #[test]
    fn test_api_error_exposes_status_and_body() {
        let err = AdzunaError::Api {
            status: 401,
            message: "{\"exception\":\"AUTH_FAIL\"}".into(),
        };
        assert_eq!(err.status(), Some(401));
        assert_eq!(err.body(), Some("{\"exception\":\"AUTH_FAIL\"}"));
        assert!(!err.is_timeout());
    }

    async fn serve(app: axum::Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        format!("http://{}", addr)
    }

    fn client(base_url: &str) -> AdzunaClient {
        AdzunaClient::new("id".into(), "key".into()).with_base_url(base_url)
    }

    #[tokio::test]
    async fn test_search_against_stub() {
        use axum::extract::Query;
        use std::collections::HashMap;

        let app = axum::Router::new().route(
            "/v1/api/jobs/ca/search/1",
            axum::routing::get(|Query(q): Query<HashMap<String, String>>| async move {
                let body = format!(
                    r#"{{"count":1,"results":[{{"id":"9","title":"{} for {}","company":{{"display_name":"Maple Labs"}}}}]}}"#,
                    q.get("what").cloned().unwrap_or_default(),
                    q.get("app_id").cloned().unwrap_or_default(),
                );
                ([("content-type", "application/json")], body)
            }),
        );
        let base = serve(app).await;

        let page = client(&base)
            .search(&SearchParams::new("ca", "intern"))
            .await
            .unwrap();

        assert_eq!(page.count, Some(1));
        assert_eq!(page.results[0].title.as_deref(), Some("intern for id"));
        assert_eq!(
            page.results[0].company.as_ref().and_then(|c| c.display_name.as_deref()),
            Some("Maple Labs")
        );
    }

    #[tokio::test]
    async fn test_search_non_2xx_keeps_status_and_body() {
        let app = axum::Router::new().route(
            "/v1/api/jobs/ca/search/1",
            axum::routing::get(|| async {
                (
                    axum::http::StatusCode::UNAUTHORIZED,
                    "{\"exception\":\"AUTH_FAIL\"}",
                )
            }),
        );
        let base = serve(app).await;

        let err = client(&base)
            .search(&SearchParams::new("ca", "intern"))
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(401));
        assert_eq!(err.body(), Some("{\"exception\":\"AUTH_FAIL\"}"));
    }

    #[tokio::test]
    async fn test_search_undecodable_body_is_parse_error() {
        let app = axum::Router::new().route(
            "/v1/api/jobs/ca/search/1",
            axum::routing::get(|| async { "<html>maintenance</html>" }),
        );
        let base = serve(app).await;

        let err = client(&base)
            .search(&SearchParams::new("ca", "intern"))
            .await
            .unwrap_err();

        assert!(matches!(err, AdzunaError::Parse { .. }));
        assert_eq!(err.body(), Some("<html>maintenance</html>"));
    }
}
