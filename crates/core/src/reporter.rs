use std::sync::Mutex;

use tracing::{error, info, warn};

use crate::types::ResultItem;

/// Console side of a run. Output-file content never goes through here.
pub trait Reporter: Send + Sync {
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);
    fn query_started(&self, index: usize, total: usize, query: &str);
    fn result(&self, item: &ResultItem);
    fn no_results(&self, query: &str);
}

/// Status through `tracing`, result links on stdout so they can be piped.
#[derive(Debug, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn info(&self, message: &str) {
        info!("{}", message);
    }

    fn warn(&self, message: &str) {
        warn!("{}", message);
    }

    fn error(&self, message: &str) {
        error!("{}", message);
    }

    fn query_started(&self, index: usize, total: usize, query: &str) {
        info!(dork = index + 1, total, query, "running dork");
    }

    fn result(&self, item: &ResultItem) {
        println!("{}", item.link);
    }

    fn no_results(&self, query: &str) {
        info!(query, "no results found");
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportEvent {
    Info(String),
    Warn(String),
    Error(String),
    QueryStarted { index: usize, total: usize, query: String },
    Result(String),
    NoResults(String),
}

/// Keeps every event in order; used to assert on console behavior in tests.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    events: Mutex<Vec<ReportEvent>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ReportEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    fn push(&self, event: ReportEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl Reporter for MemoryReporter {
    fn info(&self, message: &str) {
        self.push(ReportEvent::Info(message.to_string()));
    }

    fn warn(&self, message: &str) {
        self.push(ReportEvent::Warn(message.to_string()));
    }

    fn error(&self, message: &str) {
        self.push(ReportEvent::Error(message.to_string()));
    }

    fn query_started(&self, index: usize, total: usize, query: &str) {
        self.push(ReportEvent::QueryStarted {
            index,
            total,
            query: query.to_string(),
        });
    }

    fn result(&self, item: &ResultItem) {
        self.push(ReportEvent::Result(item.link.clone()));
    }

    fn no_results(&self, query: &str) {
        self.push(ReportEvent::NoResults(query.to_string()));
    }
}
