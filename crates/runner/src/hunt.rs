use std::io::Write;
use std::time::Duration;

use tracing::info;

use dorkhunter_core::config::HuntConfig;
use dorkhunter_core::{QuotaPolicy, Reporter, RunError, SearchBackend};
use dorkhunter_dorks::QueryPlan;
use dorkhunter_storage::{ResultWriter, ERROR_PREFIX};

use crate::paginate::{collect_results, effective_limit};

#[derive(Debug, Clone)]
pub struct HuntSettings {
    pub limit: u32,
    pub page_delay: Duration,
    pub query_delay: Duration,
    pub quota_policy: QuotaPolicy,
    pub quota_pause: Duration,
}

impl HuntSettings {
    pub fn from_config(config: &HuntConfig) -> Self {
        Self {
            limit: config.limit,
            page_delay: config.page_delay(),
            query_delay: config.query_delay(),
            quota_policy: config.quota_policy,
            quota_pause: config.quota_pause(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HuntSummary {
    pub queries_planned: usize,
    pub queries_run: usize,
    pub queries_with_results: usize,
    pub queries_failed: usize,
    pub urls_written: usize,
    pub aborted: bool,
}

/// One sequential pass over a query plan against a single backend.
pub struct Hunt<'a> {
    backend: &'a dyn SearchBackend,
    reporter: &'a dyn Reporter,
    settings: HuntSettings,
}

impl<'a> Hunt<'a> {
    pub fn new(backend: &'a dyn SearchBackend, reporter: &'a dyn Reporter, settings: HuntSettings) -> Self {
        Self {
            backend,
            reporter,
            settings,
        }
    }

    /// Run every query in order, writing each section as soon as it is done.
    /// Backend failures land in the output; only output I/O errors end the run.
    pub async fn run<W: Write>(
        &self,
        plan: &QueryPlan,
        writer: &mut ResultWriter<W>,
    ) -> Result<HuntSummary, RunError> {
        let mut summary = HuntSummary {
            queries_planned: plan.len(),
            ..Default::default()
        };

        if plan.is_empty() {
            self.reporter.warn("no applicable dorks, nothing to run");
            return Ok(summary);
        }

        let limit = effective_limit(self.backend, self.settings.limit);
        if limit < self.settings.limit {
            self.reporter.warn(&format!(
                "limit {} exceeds the {} backend maximum, using {}",
                self.settings.limit,
                self.backend.name(),
                limit
            ));
        }

        writer.write_target(plan.target_label())?;
        let total = plan.len();

        for (index, query) in plan.queries.iter().enumerate() {
            self.reporter.query_started(index, total, query);
            writer.begin_query(query)?;

            let outcome = collect_results(self.backend, query, limit, self.settings.page_delay).await;
            summary.queries_run += 1;

            for item in &outcome.items {
                self.reporter.result(item);
            }
            if !outcome.items.is_empty() {
                writer.write_items(&outcome.items)?;
                summary.queries_with_results += 1;
                summary.urls_written += outcome.items.len();
            } else if outcome.error.is_none() {
                writer.write_items(&[])?;
                self.reporter.no_results(query);
            }

            let mut quota_hit = false;
            if let Some(err) = &outcome.error {
                summary.queries_failed += 1;
                let message = format!("{} API error occurred: {}", ERROR_PREFIX, err);
                self.reporter.error(&message);
                writer.write_error(&message)?;
                quota_hit = err.is_quota();
            }

            writer.end_query()?;

            let is_last = index + 1 == total;
            match (quota_hit, self.settings.quota_policy) {
                (true, QuotaPolicy::Abort) => {
                    if !is_last {
                        self.reporter.warn(&format!(
                            "quota exhausted, aborting; {} dork(s) not attempted",
                            total - index - 1
                        ));
                    }
                    summary.aborted = true;
                    break;
                }
                (true, QuotaPolicy::Pause) if !is_last => {
                    self.reporter.warn(&format!(
                        "quota exhausted, pausing {}s before the next dork",
                        self.settings.quota_pause.as_secs()
                    ));
                    tokio::time::sleep(self.settings.quota_pause).await;
                }
                _ if !is_last && !self.settings.query_delay.is_zero() => {
                    tokio::time::sleep(self.settings.query_delay).await;
                }
                _ => {}
            }
        }

        info!(
            run = summary.queries_run,
            planned = summary.queries_planned,
            with_results = summary.queries_with_results,
            failed = summary.queries_failed,
            urls = summary.urls_written,
            aborted = summary.aborted,
            "hunt complete"
        );
        Ok(summary)
    }
}
