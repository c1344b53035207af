pub mod auditor;
pub mod cli;
pub mod config;
pub mod fetcher;
pub mod http_client;
pub mod link_checker;
pub mod models;
pub mod reporter;
pub mod robots;
pub mod scorer;
pub mod seo_analyzer;
pub mod target;
pub mod technical;

use anyhow::Result;
use auditor::{AuditOptions, Auditor};
use cli::Cli;
use colored::*;
use config::Config;
use reporter::Reporter;
use std::time::Duration;

/// Resolves CLI and config file settings into engine options
pub fn resolve_options(args: &Cli) -> AuditOptions {
    let max_links = if args.fast { 0 } else { args.max_links };
    AuditOptions::new(max_links, args.workers)
        .with_page_timeout(Duration::from_secs(args.timeout.max(1)))
}

pub async fn run(args: Cli) -> Result<()> {
    let args = match Config::load(args.config.as_deref())? {
        Some(config) => config.merge_with_cli(&args),
        None => args,
    };

    let text_mode = args.output != "json" && !args.summary;
    let options = resolve_options(&args);

    if text_mode {
        println!("{}", "SEO Audit - Single Page Analyzer".bright_cyan().bold());
        println!("{}", "=".repeat(50).bright_blue());
        println!();
        println!("{} {}", "Auditing:".bright_white().bold(), args.url);
        if options.fast_mode() {
            println!("{}", "Fast mode: link checks skipped".bright_white());
        } else {
            println!(
                "{} {} per side, {} workers",
                "Link sample:".bright_white().bold(),
                options.max_links,
                options.workers
            );
        }
        println!();
    }

    let mut auditor = Auditor::new(options)?;
    if text_mode {
        auditor.enable_progress_bar();
    }

    let report = auditor.audit(&args.url).await;

    if args.summary {
        let summary = Reporter::build_summary(&report);
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else if args.output == "json" {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        Reporter::print_text_report(&report);
    }

    if let Some(filename) = args.save {
        Reporter::save_json_report(&report, &filename)?;
    }

    Ok(())
}
