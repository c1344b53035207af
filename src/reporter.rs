use crate::models::{AuditReport, LinkOutcome, Presence};
use anyhow::{Context, Result};
use colored::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;

const SUMMARY_TITLE_MAX: usize = 70;
const SUMMARY_TOP_RECOMMENDATIONS: usize = 5;

/// Condensed view of a report for quick console output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub url: String,
    pub score: u32,
    pub status: StatusSummary,
    pub on_page: OnPageSummary,
    pub links: LinksSummary,
    pub social_structured: SocialSummary,
    pub robots_sitemap: RobotsSummary,
    pub top_recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSummary {
    pub code: Option<u16>,
    pub response_time_ms: u64,
    pub size_bytes: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OnPageSummary {
    pub title: Option<String>,
    pub meta_description_len: usize,
    pub h1_count: usize,
    pub images_missing_alt: usize,
    pub canonical_present: bool,
    pub viewport: bool,
    pub noindex: bool,
    pub nofollow: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinksSummary {
    pub internal_checked: usize,
    pub external_checked: usize,
    pub broken_internal: usize,
    pub broken_external: usize,
    pub redirects: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SocialSummary {
    pub open_graph: bool,
    pub twitter_card: bool,
    pub json_ld_blocks: usize,
    pub json_ld_errors: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobotsSummary {
    pub robots_txt: Option<Presence>,
    pub sitemap: Option<Presence>,
}

pub struct Reporter;

impl Reporter {
    pub fn build_summary(report: &AuditReport) -> ReportSummary {
        let on_page = report
            .on_page()
            .map(|onp| OnPageSummary {
                title: onp.title.as_deref().map(|t| truncate(t, SUMMARY_TITLE_MAX)),
                meta_description_len: onp.meta_description_info.length,
                h1_count: onp.h1_tags.len(),
                images_missing_alt: onp.images_missing_alt.len(),
                canonical_present: onp.canonical.is_some(),
                viewport: onp.has_viewport_meta,
                noindex: onp.meta_robots.noindex,
                nofollow: onp.meta_robots.nofollow,
            })
            .unwrap_or_default();

        let links = report
            .links()
            .map(|links| LinksSummary {
                internal_checked: links.internal_count,
                external_checked: links.external_count,
                broken_internal: links.broken_internal_total,
                broken_external: links.broken_external_total,
                redirects: links.redirects_total,
            })
            .unwrap_or_default();

        let social_structured = report
            .social_structured()
            .map(|social| SocialSummary {
                open_graph: social.open_graph,
                twitter_card: social.twitter_card,
                json_ld_blocks: social.json_ld_blocks,
                json_ld_errors: social.json_ld_errors,
            })
            .unwrap_or_default();

        ReportSummary {
            url: report.url().to_string(),
            score: report.score().overall,
            status: StatusSummary {
                code: report.technical().status_code(),
                response_time_ms: report.technical().response_time_ms(),
                size_bytes: report.technical().signals().map(|s| s.content_length),
            },
            on_page,
            links,
            social_structured,
            robots_sitemap: RobotsSummary {
                robots_txt: report.robots_sitemap().map(|rs| rs.robots_txt),
                sitemap: report.robots_sitemap().map(|rs| rs.sitemap),
            },
            top_recommendations: report
                .recommendations()
                .iter()
                .take(SUMMARY_TOP_RECOMMENDATIONS)
                .cloned()
                .collect(),
        }
    }

    pub fn print_text_report(report: &AuditReport) {
        println!("\n{}", "=".repeat(80).bright_blue());
        println!("{}", "SEO Audit Report".bright_cyan().bold());
        println!("{}", "=".repeat(80).bright_blue());
        println!();

        println!("{}: {}", "URL".bright_white().bold(), report.url());
        println!(
            "{}: {}",
            "Generated".bright_white().bold(),
            report.run().generated_at
        );
        println!(
            "{}: {:.1}s ({} workers{})",
            "Analysis time".bright_white().bold(),
            report.run().analysis_time,
            report.run().workers_used,
            if report.run().fast_mode { ", fast mode" } else { "" }
        );
        println!();

        let overall = report.score().overall;
        let score = format!("{}/100", overall);
        println!(
            "{} {}",
            "Score:".bright_yellow().bold(),
            if overall >= 80 {
                score.bright_green().bold()
            } else if overall >= 50 {
                score.yellow().bold()
            } else {
                score.bright_red().bold()
            }
        );
        for deduction in &report.score().deductions {
            println!("  -{:<3} {}", deduction.points, deduction.reason.dimmed());
        }
        println!();

        if let Some(error) = report.technical().error() {
            println!("{} {}", "Fetch failed:".bright_red().bold(), error);
        }

        if let Some(onp) = report.on_page() {
            println!("{}", "On-page".bright_yellow().bold().underline());
            println!(
                "  Title:            {}",
                onp.title.as_deref().unwrap_or("(missing)")
            );
            println!(
                "  Meta description: {} chars",
                onp.meta_description_info.length
            );
            println!("  H1 tags:          {}", onp.h1_info.count);
            println!(
                "  Images:           {} total, {} missing alt",
                onp.images_info.total,
                onp.images_missing_alt.len()
            );
            println!(
                "  Canonical:        {}",
                onp.canonical.as_deref().unwrap_or("(missing)")
            );
            println!("  Viewport meta:    {}", yes_no(onp.has_viewport_meta));
            println!(
                "  Lang / charset:   {} / {}",
                onp.lang_charset.lang.as_deref().unwrap_or("-"),
                onp.lang_charset.charset.as_deref().unwrap_or("-")
            );
            println!();
        }

        if let Some(social) = report.social_structured() {
            println!("{}", "Social & Structured Data".bright_yellow().bold().underline());
            println!("  Open Graph:       {}", yes_no(social.open_graph));
            println!("  Twitter Card:     {}", yes_no(social.twitter_card));
            println!(
                "  JSON-LD:          {} valid, {} invalid",
                social.json_ld_blocks, social.json_ld_errors
            );
            println!();
        }

        if let Some(tech) = report.technical().signals() {
            println!("{}", "Technical".bright_yellow().bold().underline());
            println!("  Status:           {}", tech.status_code);
            println!("  Response time:    {} ms", tech.response_time_ms);
            println!("  Content length:   {} bytes", tech.content_length);
            println!("  Compression:      {}", yes_no(tech.gzip));
            println!("  HSTS:             {}", yes_no(tech.hsts));
            println!(
                "  Security headers: nosniff {}, frame {}, referrer {}, csp {}",
                yes_no(tech.x_content_type_options),
                yes_no(tech.x_frame_options),
                yes_no(tech.referrer_policy),
                yes_no(tech.csp)
            );
            println!();
        }

        if let Some(rs) = report.robots_sitemap() {
            println!("{}", "Robots & Sitemap".bright_yellow().bold().underline());
            println!("  robots.txt:       {:?}", rs.robots_txt);
            println!("  sitemap.xml:      {:?}", rs.sitemap);
            for note in &rs.robots_notes {
                println!("  {}", note.dimmed());
            }
            println!();
        }

        if let Some(links) = report.links() {
            println!("{}", "Links".bright_yellow().bold().underline());
            println!(
                "  Checked:          {} internal, {} external",
                links.internal_count, links.external_count
            );
            print_outcomes("Broken internal", links.broken_internal_total, &links.broken_internal);
            print_outcomes("Broken external", links.broken_external_total, &links.broken_external);
            print_outcomes("Redirects", links.redirects_total, &links.redirects);
            println!();
        }

        if !report.recommendations().is_empty() {
            println!("{}", "Recommendations".bright_yellow().bold().underline());
            for recommendation in report.recommendations() {
                println!("  - {}", recommendation);
            }
        }

        println!();
        println!("{}", "=".repeat(80).bright_blue());
    }

    pub fn save_json_report(report: &AuditReport, filename: &str) -> Result<()> {
        let json = serde_json::to_string_pretty(report)?;
        let mut file = File::create(filename)
            .with_context(|| format!("Failed to create report file: {}", filename))?;
        file.write_all(json.as_bytes())
            .with_context(|| format!("Failed to write report file: {}", filename))?;
        eprintln!("Report saved to: {}", filename.bright_green());
        Ok(())
    }
}

fn print_outcomes(label: &str, total: usize, outcomes: &[LinkOutcome]) {
    if total == 0 {
        return;
    }
    println!("  {} ({}):", label, total.to_string().bright_red());
    for outcome in outcomes {
        let status = if outcome.status == 0 {
            "unreachable".to_string()
        } else {
            outcome.status.to_string()
        };
        println!("    [{}] {} ({} ms)", status, outcome.url, outcome.elapsed_ms);
    }
}

fn yes_no(flag: bool) -> ColoredString {
    if flag {
        "Yes".bright_green()
    } else {
        "No".bright_red()
    }
}

fn truncate(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        text.to_string()
    } else {
        let mut truncated: String = text.chars().take(max_len - 1).collect();
        truncated.push('…');
        truncated
    }
}
