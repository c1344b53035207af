use crate::fetcher::{self, FetchError, FetchResult};
use crate::http_client::build_page_client;
use crate::link_checker::{DEFAULT_WORKERS, LinkChecker, LinkSample, MAX_WORKERS};
pub use crate::models::FetchFailure;
use crate::models::{AuditReport, AuditSections, Recommendations, RunMetadata};
use crate::robots::RobotsProber;
use crate::scorer::Scorer;
use crate::seo_analyzer::SeoAnalyzer;
use crate::target::AuditTarget;
use crate::technical;
use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use scraper::Html;
use std::time::{Duration, Instant};
use url::Url;

pub const DEFAULT_MAX_LINKS: usize = 25;
pub const DEFAULT_PAGE_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_PAGE_TIMEOUT: Duration = Duration::from_secs(DEFAULT_PAGE_TIMEOUT_SECS);

const LINK_PROGRESS_TEMPLATE: &str = "[{elapsed_precise}] {spinner:.cyan} Checking links: {pos} {msg}";
const SPINNER_TICK: Duration = Duration::from_millis(100);

/// Configuration accepted by the audit engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditOptions {
    /// Links sampled per side (internal and external); 0 skips link checks
    pub max_links: usize,
    /// Concurrent link probes, clamped to `1..=20`
    pub workers: usize,
    pub page_timeout: Duration,
}

impl Default for AuditOptions {
    fn default() -> Self {
        Self {
            max_links: DEFAULT_MAX_LINKS,
            workers: DEFAULT_WORKERS,
            page_timeout: DEFAULT_PAGE_TIMEOUT,
        }
    }
}

impl AuditOptions {
    pub fn new(max_links: usize, workers: usize) -> Self {
        Self {
            max_links,
            workers: workers.clamp(1, MAX_WORKERS),
            ..Default::default()
        }
    }

    pub fn with_page_timeout(mut self, timeout: Duration) -> Self {
        self.page_timeout = timeout;
        self
    }

    pub fn fast_mode(&self) -> bool {
        self.max_links == 0
    }
}

pub struct Auditor {
    page_client: reqwest::Client,
    link_checker: LinkChecker,
    robots: RobotsProber,
    options: AuditOptions,
    progress_bar: Option<ProgressBar>,
}

impl Auditor {
    pub fn new(options: AuditOptions) -> Result<Self> {
        Ok(Self {
            page_client: build_page_client(options.page_timeout)?,
            link_checker: LinkChecker::new(options.workers)?,
            robots: RobotsProber::new()?,
            options,
            progress_bar: None,
        })
    }

    /// Enable a spinner counting validated links
    pub fn enable_progress_bar(&mut self) {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template(LINK_PROGRESS_TEMPLATE)
                .expect("Progress bar template should be valid"),
        );
        self.progress_bar = Some(pb);
    }

    pub fn options(&self) -> &AuditOptions {
        &self.options
    }

    /// Audits one page. Never fails: an unreachable page or an HTTP error
    /// status yields a failure report instead.
    pub async fn audit(&self, raw_url: &str) -> AuditReport {
        let started = Instant::now();
        let target = AuditTarget::new(raw_url);
        tracing::info!(url = %target.url, "Starting audit");

        let fetched = match fetcher::fetch_page(&self.page_client, &target.url).await {
            Ok(fetched) => fetched,
            Err(FetchError { message, elapsed }) => {
                tracing::warn!(url = %target.url, error = %message, "Failed to fetch page");
                return AuditReport::failure(
                    &target,
                    FetchFailure::Unreachable { error: message },
                    elapsed,
                    self.run_metadata(started),
                );
            }
        };

        if fetched.status >= 400 {
            tracing::warn!(url = %target.url, status = fetched.status, "Page returned an HTTP error");
            return AuditReport::failure(
                &target,
                FetchFailure::HttpStatus {
                    status_code: fetched.status,
                },
                fetched.elapsed,
                self.run_metadata(started),
            );
        }

        let page_url = match target
            .parsed()
            .cloned()
            .or_else(|| Url::parse(&fetched.final_url).ok())
        {
            Some(url) => url,
            None => {
                return AuditReport::failure(
                    &target,
                    FetchFailure::Unreachable {
                        error: format!("invalid URL: {}", target.url),
                    },
                    fetched.elapsed,
                    self.run_metadata(started),
                );
            }
        };

        let report = self.audit_fetched(&target, &page_url, &fetched, started).await;
        tracing::info!(
            url = %report.url(),
            score = report.score().overall,
            recommendations = report.recommendations().len(),
            "Audit complete"
        );
        report
    }

    async fn audit_fetched(
        &self,
        target: &AuditTarget,
        page_url: &Url,
        fetched: &FetchResult,
        started: Instant,
    ) -> AuditReport {
        let mut recommendations = Recommendations::new();

        // The parsed document is not Send, so everything that needs it
        // happens before the first await.
        let (on_page, social_structured, sample) = {
            let document = Html::parse_document(&fetched.body);
            let on_page = SeoAnalyzer::analyze(&document, page_url, &mut recommendations);
            let social = SeoAnalyzer::analyze_social(&document, &mut recommendations);
            let sample = if self.options.fast_mode() {
                LinkSample::default()
            } else {
                LinkChecker::sample(
                    LinkChecker::extract_candidates(&document, page_url),
                    self.options.max_links,
                )
            };
            (on_page, social, sample)
        };

        let technical = technical::extract(fetched, target.is_https(), &mut recommendations);

        let sampled = sample.len();
        let progress = self.progress_bar.as_ref().filter(|_| sampled > 0);
        if let Some(pb) = progress {
            pb.enable_steady_tick(SPINNER_TICK);
        }
        let ((robots_sitemap, robots_recs), (links, link_recs)) = tokio::join!(
            self.robots.probe(target),
            self.link_checker.validate(sample, progress)
        );
        if let Some(pb) = progress {
            pb.finish_with_message(format!("Checked {} links", sampled));
        }

        recommendations.extend(robots_recs);
        recommendations.extend(link_recs);

        let sections = AuditSections {
            on_page,
            social_structured,
            links,
            technical,
            robots_sitemap,
        };
        let score = Scorer::score(&sections, target.is_https());

        AuditReport::assemble(
            target,
            sections,
            recommendations,
            score,
            self.run_metadata(started),
        )
    }

    fn run_metadata(&self, started: Instant) -> RunMetadata {
        RunMetadata {
            analysis_time: started.elapsed().as_secs_f64(),
            workers_used: self.link_checker.workers(),
            fast_mode: self.options.fast_mode(),
            generated_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}
