use std::path::PathBuf;

use clap::Parser;

use dorkhunter_core::{BackendKind, QuotaPolicy};

#[derive(Parser, Debug)]
#[command(
    name = "dorkhunter",
    version,
    about = "Search-engine dorking for exposed Swagger / OpenAPI documentation"
)]
pub struct Cli {
    /// Google API key (overrides GOOGLE_API_KEY and the config file)
    #[arg(short = 'k', long)]
    pub api_key: Option<String>,

    /// Programmable Search Engine ID (overrides GOOGLE_CSE_ID and the config file)
    #[arg(short = 'c', long)]
    pub cse_id: Option<String>,

    /// Target domain; empty searches all websites
    #[arg(short = 'u', long, default_value = "")]
    pub domain: String,

    /// Total results per dork (capped at the backend maximum, 100 for the API)
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    pub limit: Option<u32>,

    /// Output file
    #[arg(short, long, required_unless_present = "dry_run")]
    pub output: Option<PathBuf>,

    /// A single custom dork
    #[arg(short, long)]
    pub dork: Option<String>,

    /// File with one dork per line
    #[arg(long)]
    pub dork_file: Option<PathBuf>,

    /// Append to the output file instead of overwriting it
    #[arg(long)]
    pub append: bool,

    /// Path to config file (YAML or TOML)
    #[arg(long, default_value = "config.yaml")]
    pub config: PathBuf,

    /// Search backend: api or scrape
    #[arg(short, long)]
    pub backend: Option<BackendKind>,

    /// What to do when the quota runs out: abort or pause
    #[arg(long)]
    pub on_quota: Option<QuotaPolicy>,

    /// Print the resolved dorks and exit without searching
    #[arg(long)]
    pub dry_run: bool,
}
