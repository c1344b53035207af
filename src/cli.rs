use crate::auditor::{DEFAULT_MAX_LINKS, DEFAULT_PAGE_TIMEOUT_SECS};
use crate::link_checker::DEFAULT_WORKERS;
use clap::Parser;

pub const DEFAULT_OUTPUT: &str = "text";

#[derive(Parser, Debug)]
#[command(name = "seoaudit")]
#[command(about = "A single-page SEO and technical health auditor", long_about = None)]
pub struct Cli {
    /// The page to audit (https:// is assumed when no scheme is given)
    #[arg(value_name = "URL")]
    pub url: String,

    /// Maximum internal and external links to check, each
    #[arg(short, long, default_value_t = DEFAULT_MAX_LINKS)]
    pub max_links: usize,

    /// Number of concurrent link checks, 1-20
    #[arg(short, long, default_value_t = DEFAULT_WORKERS)]
    pub workers: usize,

    /// Skip link checking entirely
    #[arg(short, long)]
    pub fast: bool,

    /// Timeout in seconds for the main page fetch
    #[arg(short, long, default_value_t = DEFAULT_PAGE_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Output format: text or json
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    pub output: String,

    /// Print a condensed JSON summary instead of the full report
    #[arg(long)]
    pub summary: bool,

    /// Save the JSON report to a file
    #[arg(short, long)]
    pub save: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Path to configuration file (JSON, TOML, or YAML)
    #[arg(long)]
    pub config: Option<String>,
}
