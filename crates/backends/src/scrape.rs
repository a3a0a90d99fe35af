use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};
use url::Url;

use dorkhunter_core::{BackendError, ConfigError, PageRequest, ResultItem, SearchBackend, SearchPage};

pub const SCRAPE_ENDPOINT: &str = "https://www.google.com/search";

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";

/// Hosts that show up in result pages but are never results themselves.
const IGNORED_HOSTS: &[&str] = &["googleusercontent.com", "gstatic.com"];

/// Best-effort scrape of a search engine's HTML result page. The engine
/// reports no total, so stop counts are approximate.
pub struct ScrapeBackend {
    client: reqwest::Client,
    endpoint: Url,
}

impl ScrapeBackend {
    pub fn new(timeout: Duration) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;
        let endpoint = Url::parse(SCRAPE_ENDPOINT).map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self { client, endpoint })
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Result<Self, ConfigError> {
        self.endpoint = Url::parse(endpoint).map_err(|_| ConfigError::Invalid {
            field: "endpoint",
            value: endpoint.to_string(),
        })?;
        Ok(self)
    }

    fn engine_domain(&self) -> String {
        let host = self.endpoint.host_str().unwrap_or("");
        host.strip_prefix("www.").unwrap_or(host).to_string()
    }
}

#[async_trait]
impl SearchBackend for ScrapeBackend {
    fn name(&self) -> &str {
        "scrape"
    }

    async fn search(&self, request: &PageRequest) -> Result<SearchPage, BackendError> {
        debug!(query = %request.query, start = request.start, num = request.count, "scraping result page");

        // the html endpoint counts from 0
        let num = request.count.to_string();
        let start = request.start.saturating_sub(1).to_string();
        let resp = self
            .client
            .get(self.endpoint.clone())
            .query(&[
                ("q", request.query.as_str()),
                ("num", num.as_str()),
                ("start", start.as_str()),
                ("hl", "en"),
            ])
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        let status = resp.status();
        if status.as_u16() == 429 {
            warn!(query = %request.query, "search page rate limited");
            return Err(BackendError::Quota("HTTP 429 Too Many Requests".to_string()));
        }
        if resp.url().path().starts_with("/sorry") {
            warn!(query = %request.query, "redirected to captcha interstitial");
            return Err(BackendError::Quota(format!("blocked: redirected to {}", resp.url())));
        }
        if !status.is_success() {
            return Err(BackendError::Api {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("unexpected status").to_string(),
            });
        }

        let body = resp
            .text()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        let items = extract_results(&body, &self.engine_domain());
        let next_start = if items.is_empty() {
            None
        } else {
            Some(request.start + request.count)
        };

        Ok(SearchPage { items, next_start })
    }
}

fn selector(s: &str) -> Option<Selector> {
    Selector::parse(s).ok()
}

/// Pull result links out of a result page, in page order, each link once.
pub fn extract_results(html: &str, engine_domain: &str) -> Vec<ResultItem> {
    let document = Html::parse_document(html);
    let (Some(anchors), Some(h3)) = (selector("a[href]"), selector("h3")) else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut items = Vec::new();

    for a in document.select(&anchors) {
        let Some(href) = a.value().attr("href") else {
            continue;
        };
        let Some(link) = result_link(href, engine_domain) else {
            continue;
        };
        if !seen.insert(link.clone()) {
            continue;
        }
        items.push(ResultItem {
            link,
            title: anchor_title(&a, &h3),
            snippet: None,
        });
    }

    items
}

fn anchor_title(a: &ElementRef<'_>, h3: &Selector) -> Option<String> {
    a.select(h3)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Resolve a raw href to an external result URL, if it is one.
fn result_link(href: &str, engine_domain: &str) -> Option<String> {
    if href.starts_with("/url?") {
        let wrapped = Url::parse(&format!("https://{}{}", engine_domain, href)).ok()?;
        let target = wrapped
            .query_pairs()
            .find(|(k, _)| k == "q" || k == "url")
            .map(|(_, v)| v.into_owned())?;
        return external_url(&target, engine_domain);
    }
    if href.starts_with("http://") || href.starts_with("https://") {
        return external_url(href, engine_domain);
    }
    None
}

fn external_url(candidate: &str, engine_domain: &str) -> Option<String> {
    let parsed = Url::parse(candidate).ok()?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return None;
    }
    let host = parsed.host_str()?;
    let is_engine = |domain: &str| host == domain || host.ends_with(&format!(".{}", domain));
    if is_engine(engine_domain) || IGNORED_HOSTS.iter().any(|d| is_engine(*d)) {
        return None;
    }
    Some(parsed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <a href="https://www.google.com/preferences">Settings</a>
          <div class="g">
            <a href="/url?q=https://api.example.com/swagger-ui/index.html&sa=U&ved=abc">
              <h3>Swagger UI</h3>
            </a>
          </div>
          <div class="g">
            <a href="https://dev.example.com/v2/api-docs"><h3>api-docs</h3></a>
            <a href="https://dev.example.com/v2/api-docs">duplicate</a>
          </div>
          <a href="/search?q=next&start=10">Next</a>
          <a href="https://webcache.googleusercontent.com/search?q=cache:x">Cached</a>
          <a href="/url?q=https://maps.google.com/x">Maps</a>
        </body></html>
    "#;

    #[test]
    fn test_extract_results() {
        let items = extract_results(PAGE, "google.com");
        let links: Vec<_> = items.iter().map(|i| i.link.as_str()).collect();
        assert_eq!(
            links,
            vec![
                "https://api.example.com/swagger-ui/index.html",
                "https://dev.example.com/v2/api-docs",
            ]
        );
        assert_eq!(items[0].title.as_deref(), Some("Swagger UI"));
    }

    #[test]
    fn test_extract_results_empty_page() {
        assert!(extract_results("<html><body>No results</body></html>", "google.com").is_empty());
    }

    #[test]
    fn test_result_link_rejects_non_http() {
        assert_eq!(result_link("javascript:void(0)", "google.com"), None);
        assert_eq!(result_link("/url?q=ftp://files.example.com/", "google.com"), None);
    }
}
