use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::BackendError;

/// Every search provider implements this
#[async_trait]
pub trait SearchBackend: Send + Sync {
    fn name(&self) -> &str;

    /// Most items a single call may return.
    fn page_size(&self) -> u32 {
        10
    }

    /// Hard cap on results reachable for one query, if the provider has one.
    fn max_results(&self) -> Option<u32> {
        None
    }

    async fn search(&self, request: &PageRequest) -> Result<SearchPage, BackendError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub query: String,
    /// 1-based index of the first result wanted.
    pub start: u32,
    pub count: u32,
}

#[derive(Debug, Clone, Default)]
pub struct SearchPage {
    pub items: Vec<ResultItem>,
    /// Where the next page starts, `None` when the provider has no more.
    pub next_start: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultItem {
    pub link: String,
    pub title: Option<String>,
    pub snippet: Option<String>,
}

impl ResultItem {
    pub fn new(link: impl Into<String>) -> Self {
        Self {
            link: link.into(),
            title: None,
            snippet: None,
        }
    }
}

/// Which provider a run talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Api,
    Scrape,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Api => "api",
            BackendKind::Scrape => "scrape",
        }
    }
}

impl std::str::FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "api" => Ok(BackendKind::Api),
            "scrape" => Ok(BackendKind::Scrape),
            other => Err(format!("unknown backend '{}', expected api or scrape", other)),
        }
    }
}

/// What a run does when the backend reports an exhausted quota.
/// Exactly one policy applies to a whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuotaPolicy {
    /// Record the error and stop issuing queries.
    #[default]
    Abort,
    /// Record the error, sleep, then carry on with the next query.
    Pause,
}

impl std::str::FromStr for QuotaPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "abort" => Ok(QuotaPolicy::Abort),
            "pause" => Ok(QuotaPolicy::Pause),
            other => Err(format!("unknown quota policy '{}', expected abort or pause", other)),
        }
    }
}
