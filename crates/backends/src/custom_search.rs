use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use dorkhunter_core::{BackendError, ConfigError, Credentials, PageRequest, ResultItem, SearchBackend, SearchPage};

pub const CUSTOM_SEARCH_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";

/// The API refuses `start + num` beyond this.
pub const CUSTOM_SEARCH_MAX_RESULTS: u32 = 100;

/// Error reasons the API uses when a key runs out of requests.
const QUOTA_REASONS: &[&str] = &[
    "rateLimitExceeded",
    "userRateLimitExceeded",
    "dailyLimitExceeded",
    "quotaExceeded",
];

#[derive(Debug, Deserialize)]
struct CseResponse {
    #[serde(default)]
    items: Vec<CseItem>,
    #[serde(default)]
    queries: CseQueries,
}

#[derive(Debug, Deserialize)]
struct CseItem {
    link: Option<String>,
    title: Option<String>,
    snippet: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct CseQueries {
    #[serde(default, rename = "nextPage")]
    next_page: Vec<CsePageInfo>,
}

#[derive(Debug, Deserialize)]
struct CsePageInfo {
    #[serde(rename = "startIndex")]
    start_index: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct CseErrorBody {
    error: CseError,
}

#[derive(Debug, Deserialize)]
struct CseError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    errors: Vec<CseErrorReason>,
}

#[derive(Debug, Deserialize)]
struct CseErrorReason {
    #[serde(default)]
    reason: String,
}

/// Paged Custom Search JSON API.
pub struct CustomSearchBackend {
    client: reqwest::Client,
    endpoint: Url,
    credentials: Credentials,
}

impl CustomSearchBackend {
    pub fn new(credentials: Credentials, timeout: Duration) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;
        let endpoint = Url::parse(CUSTOM_SEARCH_ENDPOINT)
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            endpoint,
            credentials,
        })
    }

    /// Point at a different endpoint, e.g. a local mock.
    pub fn with_endpoint(mut self, endpoint: &str) -> Result<Self, ConfigError> {
        self.endpoint = Url::parse(endpoint).map_err(|_| ConfigError::Invalid {
            field: "endpoint",
            value: endpoint.to_string(),
        })?;
        Ok(self)
    }
}

#[async_trait]
impl SearchBackend for CustomSearchBackend {
    fn name(&self) -> &str {
        "api"
    }

    fn max_results(&self) -> Option<u32> {
        Some(CUSTOM_SEARCH_MAX_RESULTS)
    }

    async fn search(&self, request: &PageRequest) -> Result<SearchPage, BackendError> {
        debug!(query = %request.query, start = request.start, num = request.count, "custom search request");

        let num = request.count.to_string();
        let start = request.start.to_string();
        let resp = self
            .client
            .get(self.endpoint.clone())
            .query(&[
                ("key", self.credentials.api_key.as_str()),
                ("cx", self.credentials.cse_id.as_str()),
                ("q", request.query.as_str()),
                ("num", num.as_str()),
                ("start", start.as_str()),
            ])
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        if !status.is_success() {
            let err = classify_error(status.as_u16(), &body);
            warn!(status = status.as_u16(), error = %err, "custom search request failed");
            return Err(err);
        }

        parse_page(&body)
    }
}

fn parse_page(body: &str) -> Result<SearchPage, BackendError> {
    let parsed: CseResponse =
        serde_json::from_str(body).map_err(|e| BackendError::Parse(e.to_string()))?;

    let items = parsed
        .items
        .into_iter()
        .filter_map(|item| {
            item.link.map(|link| ResultItem {
                link,
                title: item.title,
                snippet: item.snippet,
            })
        })
        .collect();

    let next_start = parsed
        .queries
        .next_page
        .first()
        .and_then(|p| p.start_index);

    Ok(SearchPage { items, next_start })
}

/// Turn a non-2xx response into a typed error; quota is decided from the
/// status code and the structured error reasons.
fn classify_error(status: u16, body: &str) -> BackendError {
    let parsed = serde_json::from_str::<CseErrorBody>(body).ok();

    let message = parsed
        .as_ref()
        .map(|b| b.error.message.trim().to_string())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.trim().to_string());

    let quota_reason = parsed
        .as_ref()
        .map(|b| {
            b.error.status.as_deref() == Some("RESOURCE_EXHAUSTED")
                || b.error.errors.iter().any(|r| QUOTA_REASONS.contains(&r.reason.as_str()))
        })
        .unwrap_or(false);

    if status == 429 || quota_reason {
        BackendError::Quota(message)
    } else {
        BackendError::Api { status, message }
    }
}
