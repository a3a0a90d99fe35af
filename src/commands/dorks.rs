use anyhow::Result;
use tracing::warn;

use dorkhunter_dorks::{build_plan, resolve_dorks};

use crate::cli::Cli;

/// `--dry-run`: show what would be searched, touch nothing.
pub fn run(cli: &Cli) -> Result<()> {
    let dorks = resolve_dorks(cli.dork_file.as_deref(), cli.dork.as_deref())?;
    let plan = build_plan(&dorks.templates, &cli.domain);

    if plan.is_empty() {
        warn!("no applicable dorks: {}", dorks.empty_plan_reason());
        return Ok(());
    }

    println!("# Target: {} ({} dorks)", plan.target_label(), plan.len());
    for query in &plan.queries {
        println!("{}", query);
    }
    Ok(())
}
