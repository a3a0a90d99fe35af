use std::collections::HashSet;
use std::time::Duration;

use tracing::debug;

use dorkhunter_core::{BackendError, PageRequest, ResultItem, SearchBackend};

/// What one query produced. Items gathered before a failure are kept.
#[derive(Debug, Default)]
pub struct QueryOutcome {
    pub items: Vec<ResultItem>,
    pub error: Option<BackendError>,
    pub pages: u32,
}

/// The requested limit, clamped to the backend's hard per-query cap.
pub fn effective_limit(backend: &dyn SearchBackend, requested: u32) -> u32 {
    match backend.max_results() {
        Some(max) => requested.min(max),
        None => requested,
    }
}

/// Walk the backend's pages for `query` until `limit` distinct links are in
/// hand, a page comes back empty or adds nothing new, or the backend has no
/// next page.
pub async fn collect_results(
    backend: &dyn SearchBackend,
    query: &str,
    limit: u32,
    page_delay: Duration,
) -> QueryOutcome {
    let limit = effective_limit(backend, limit) as usize;
    let page_size = backend.page_size().max(1);

    let mut outcome = QueryOutcome::default();
    let mut seen: HashSet<String> = HashSet::new();
    let mut start = 1u32;

    while outcome.items.len() < limit {
        let remaining = (limit - outcome.items.len()) as u32;
        let request = PageRequest {
            query: query.to_string(),
            start,
            count: page_size.min(remaining),
        };

        let page = match backend.search(&request).await {
            Ok(page) => page,
            Err(e) => {
                outcome.error = Some(e);
                break;
            }
        };
        outcome.pages += 1;

        if page.items.is_empty() {
            break;
        }
        let before = outcome.items.len();
        for item in page.items {
            if outcome.items.len() == limit {
                break;
            }
            if seen.insert(item.link.clone()) {
                outcome.items.push(item);
            }
        }
        if outcome.items.len() == before {
            debug!(query, start, "page repeated earlier links, stopping");
            break;
        }

        match page.next_start {
            Some(next) if next > start => start = next,
            _ => break,
        }

        if outcome.items.len() < limit && !page_delay.is_zero() {
            tokio::time::sleep(page_delay).await;
        }
    }

    debug!(
        query,
        pages = outcome.pages,
        items = outcome.items.len(),
        failed = outcome.error.is_some(),
        "query finished"
    );
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use dorkhunter_core::SearchPage;
    use std::sync::Mutex;

    /// Serves `pages` full pages, then an empty one. Records every request.
    struct PagedStub {
        pages: u32,
        per_page: u32,
        max: Option<u32>,
        fail_on_call: Option<usize>,
        requests: Mutex<Vec<PageRequest>>,
    }

    impl PagedStub {
        fn new(pages: u32, per_page: u32) -> Self {
            Self {
                pages,
                per_page,
                max: None,
                fail_on_call: None,
                requests: Mutex::new(Vec::new()),
            }
        }

        fn requests(&self) -> Vec<PageRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SearchBackend for PagedStub {
        fn name(&self) -> &str {
            "stub"
        }

        fn max_results(&self) -> Option<u32> {
            self.max
        }

        async fn search(&self, request: &PageRequest) -> Result<SearchPage, BackendError> {
            let call = {
                let mut requests = self.requests.lock().unwrap();
                requests.push(request.clone());
                requests.len()
            };
            if self.fail_on_call == Some(call) {
                return Err(BackendError::Network("connection reset".into()));
            }

            let page_index = (request.start - 1) / self.per_page;
            if page_index >= self.pages {
                return Ok(SearchPage::default());
            }
            let items = (0..self.per_page.min(request.count))
                .map(|i| ResultItem::new(format!("https://h{}.example.com/", request.start + i)))
                .collect();
            Ok(SearchPage {
                items,
                next_start: Some(request.start + self.per_page),
            })
        }
    }

    #[tokio::test]
    async fn test_two_pages_then_empty_stops_after_three_calls() {
        let stub = PagedStub::new(2, 10);
        let outcome = collect_results(&stub, "inurl:swagger", 100, Duration::ZERO).await;

        assert_eq!(outcome.items.len(), 20);
        assert!(outcome.error.is_none());
        let starts: Vec<u32> = stub.requests().iter().map(|r| r.start).collect();
        assert_eq!(starts, vec![1, 11, 21]);
    }

    #[tokio::test]
    async fn test_limit_shrinks_last_request() {
        let stub = PagedStub::new(5, 10);
        let outcome = collect_results(&stub, "q", 25, Duration::ZERO).await;

        assert_eq!(outcome.items.len(), 25);
        let counts: Vec<u32> = stub.requests().iter().map(|r| r.count).collect();
        assert_eq!(counts, vec![10, 10, 5]);
    }

    #[tokio::test]
    async fn test_backend_cap_wins_over_limit() {
        let mut stub = PagedStub::new(50, 10);
        stub.max = Some(30);
        let outcome = collect_results(&stub, "q", 500, Duration::ZERO).await;

        assert_eq!(outcome.items.len(), 30);
        assert_eq!(stub.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_never_exceeds_limit_even_if_backend_overdelivers() {
        struct Greedy;

        #[async_trait]
        impl SearchBackend for Greedy {
            fn name(&self) -> &str {
                "greedy"
            }

            async fn search(&self, request: &PageRequest) -> Result<SearchPage, BackendError> {
                let items = (0..50).map(|i| ResultItem::new(format!("https://g/{}", i))).collect();
                Ok(SearchPage {
                    items,
                    next_start: Some(request.start + 50),
                })
            }
        }

        let outcome = collect_results(&Greedy, "q", 7, Duration::ZERO).await;
        assert_eq!(outcome.items.len(), 7);
        assert_eq!(outcome.pages, 1);
    }

    #[tokio::test]
    async fn test_stalled_cursor_stops() {
        struct Stuck;

        #[async_trait]
        impl SearchBackend for Stuck {
            fn name(&self) -> &str {
                "stuck"
            }

            async fn search(&self, request: &PageRequest) -> Result<SearchPage, BackendError> {
                Ok(SearchPage {
                    items: vec![ResultItem::new("https://same.example.com/")],
                    next_start: Some(request.start),
                })
            }
        }

        let outcome = collect_results(&Stuck, "q", 100, Duration::ZERO).await;
        assert_eq!(outcome.pages, 1);
        assert_eq!(outcome.items.len(), 1);
    }

    #[tokio::test]
    async fn test_repeated_page_is_deduplicated_and_stops() {
        struct Echo {
            calls: Mutex<u32>,
        }

        #[async_trait]
        impl SearchBackend for Echo {
            fn name(&self) -> &str {
                "echo"
            }

            async fn search(&self, request: &PageRequest) -> Result<SearchPage, BackendError> {
                *self.calls.lock().unwrap() += 1;
                Ok(SearchPage {
                    items: vec![
                        ResultItem::new("https://api.example.com/swagger-ui/index.html"),
                        ResultItem::new("https://dev.example.com/v2/api-docs"),
                    ],
                    next_start: Some(request.start + request.count),
                })
            }
        }

        let echo = Echo { calls: Mutex::new(0) };
        let outcome = collect_results(&echo, "inurl:swagger", 100, Duration::ZERO).await;

        let links: Vec<&str> = outcome.items.iter().map(|i| i.link.as_str()).collect();
        assert_eq!(
            links,
            vec![
                "https://api.example.com/swagger-ui/index.html",
                "https://dev.example.com/v2/api-docs",
            ]
        );
        assert_eq!(*echo.calls.lock().unwrap(), 2);
        assert!(outcome.error.is_none());
    }

    #[tokio::test]
    async fn test_overlapping_pages_keep_only_new_links() {
        struct Overlap;

        #[async_trait]
        impl SearchBackend for Overlap {
            fn name(&self) -> &str {
                "overlap"
            }

            async fn search(&self, request: &PageRequest) -> Result<SearchPage, BackendError> {
                // each page repeats the last link of the previous one
                let first = request.start.saturating_sub(1);
                let items = (first..first + 3)
                    .map(|i| ResultItem::new(format!("https://h{}.example.com/", i)))
                    .collect();
                Ok(SearchPage {
                    items,
                    next_start: Some(request.start + 2),
                })
            }
        }

        let outcome = collect_results(&Overlap, "q", 7, Duration::ZERO).await;
        let links: Vec<String> = outcome.items.iter().map(|i| i.link.clone()).collect();
        let unique: HashSet<&String> = links.iter().collect();
        assert_eq!(links.len(), 7);
        assert_eq!(unique.len(), 7);
        assert_eq!(links[6], "https://h6.example.com/");
    }

    #[tokio::test]
    async fn test_error_keeps_earlier_pages() {
        let mut stub = PagedStub::new(5, 10);
        stub.fail_on_call = Some(2);
        let outcome = collect_results(&stub, "q", 100, Duration::ZERO).await;

        assert_eq!(outcome.items.len(), 10);
        assert!(matches!(outcome.error, Some(BackendError::Network(_))));
        assert_eq!(stub.requests().len(), 2);
    }

    #[test]
    fn test_effective_limit() {
        let mut stub = PagedStub::new(0, 10);
        assert_eq!(effective_limit(&stub, 500), 500);
        stub.max = Some(100);
        assert_eq!(effective_limit(&stub, 500), 100);
        assert_eq!(effective_limit(&stub, 20), 20);
    }
}
