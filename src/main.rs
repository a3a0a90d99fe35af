mod cli;
mod commands;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::error;

use dorkhunter_core::{AppConfig, ConfigOverrides};

use crate::cli::Cli;

fn main() -> Result<()> {
    // One query at a time; no worker pool needed
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async_main())
}

async fn async_main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.dry_run {
        return commands::dorks::run(&cli);
    }

    let config = load_config(&cli)?;

    if let Err(e) = commands::hunt::run(config, cli).await {
        error!(error = %e, "run failed");
        return Err(e);
    }
    Ok(())
}

/// Config file, then environment, then flags; later sources win.
fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = AppConfig::load(&cli.config)
        .with_context(|| format!("loading config {}", cli.config.display()))?;

    let flags = ConfigOverrides {
        api_key: cli.api_key.clone(),
        cse_id: cli.cse_id.clone(),
        backend: cli.backend,
        quota_policy: cli.on_quota,
        limit: cli.limit,
    };
    config.apply_overrides(ConfigOverrides::from_env(), flags)?;

    Ok(config)
}
