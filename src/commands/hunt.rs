use anyhow::{Context, Result};
use tracing::{info, warn};

use dorkhunter_backends::build_backend;
use dorkhunter_core::{AppConfig, TracingReporter};
use dorkhunter_dorks::{build_plan, resolve_dorks};
use dorkhunter_runner::{Hunt, HuntSettings};
use dorkhunter_storage::{ResultWriter, WriteMode};

use crate::cli::Cli;

pub async fn run(config: AppConfig, cli: Cli) -> Result<()> {
    let output = cli.output.context("an output file is required (-o/--output)")?;

    // Everything that can fail on configuration happens before the output is opened.
    let backend = build_backend(config.hunt.backend, &config)?;
    let dorks = resolve_dorks(cli.dork_file.as_deref(), cli.dork.as_deref())?;
    let plan = build_plan(&dorks.templates, &cli.domain);

    if plan.is_empty() {
        warn!("no applicable dorks: {}", dorks.empty_plan_reason());
        return Ok(());
    }

    info!(
        backend = backend.name(),
        target = plan.target_label(),
        dorks = plan.len(),
        quota_policy = ?config.hunt.quota_policy,
        "starting hunt"
    );

    let mode = if cli.append { WriteMode::Append } else { WriteMode::Truncate };
    let mut writer = ResultWriter::open(&output, mode, backend.name())
        .with_context(|| format!("could not open output file {}", output.display()))?;

    let reporter = TracingReporter;
    let summary = Hunt::new(backend.as_ref(), &reporter, HuntSettings::from_config(&config.hunt))
        .run(&plan, &mut writer)
        .await?;

    if summary.aborted {
        warn!(
            completed = summary.queries_run,
            planned = summary.queries_planned,
            "run aborted on quota"
        );
    }
    info!(
        path = %output.display(),
        urls = summary.urls_written,
        failed = summary.queries_failed,
        "results saved"
    );
    Ok(())
}
