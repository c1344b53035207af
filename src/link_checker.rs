use crate::http_client::{PROBE_TIMEOUT, build_probe_client};
use crate::models::{
    LinkCandidate, LinkClassification, LinkOrigin, LinkOutcome, LinksReport, ProbeResult,
    Recommendations,
};
use crate::target::host_key;
use anyhow::Result;
use futures::stream::{self, StreamExt};
use indicatif::ProgressBar;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::time::Instant;
use url::Url;

/// Upper bound on concurrent link probes
pub const MAX_WORKERS: usize = 20;
pub const DEFAULT_WORKERS: usize = 10;
/// Outcomes kept per bucket in the report; totals are kept separately
pub const MAX_REPORTED_OUTCOMES: usize = 10;

const SKIPPED_SCHEMES: [&str; 3] = ["javascript:", "mailto:", "tel:"];
const LOW_VALUE_MARKERS: [&str; 4] = ["social", "ad", "analytics", "tracking"];

static ANCHOR_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("a[href] selector should be valid"));

/// Ranked, budgeted and de-duplicated links chosen for validation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkSample {
    pub internal: Vec<LinkCandidate>,
    pub external: Vec<LinkCandidate>,
}

impl LinkSample {
    pub fn len(&self) -> usize {
        self.internal.len() + self.external.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub struct LinkChecker {
    client: reqwest::Client,
    workers: usize,
}

impl LinkChecker {
    pub fn new(workers: usize) -> Result<Self> {
        Ok(Self::with_client(build_probe_client(PROBE_TIMEOUT)?, workers))
    }

    pub fn with_client(client: reqwest::Client, workers: usize) -> Self {
        Self {
            client,
            workers: workers.clamp(1, MAX_WORKERS),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Collects every navigable anchor, resolved against the page URL, in
    /// document order.
    pub fn extract_candidates(document: &Html, page_url: &Url) -> Vec<LinkCandidate> {
        let mut candidates = Vec::new();

        for anchor in document.select(&ANCHOR_SELECTOR) {
            let Some(href) = anchor.value().attr("href").map(str::trim) else {
                continue;
            };
            let lowered = href.to_lowercase();
            if SKIPPED_SCHEMES.iter().any(|s| lowered.starts_with(s)) {
                continue;
            }

            let absolute = match page_url.join(href) {
                Ok(url) => url,
                Err(e) => {
                    tracing::debug!(href = %href, error = %e, "Skipping unparsable link");
                    continue;
                }
            };

            candidates.push(LinkCandidate {
                origin: classify_origin(page_url, &absolute),
                href: absolute.to_string(),
                score: importance_score(&anchor, &lowered),
            });
        }

        candidates
    }

    /// Ranks each side by importance (document order breaks ties), keeps at
    /// most `max_links` per side, then drops repeated URLs.
    pub fn sample(candidates: Vec<LinkCandidate>, max_links: usize) -> LinkSample {
        if max_links == 0 {
            return LinkSample::default();
        }

        let (mut internal, mut external): (Vec<_>, Vec<_>) = candidates
            .into_iter()
            .partition(|c| c.origin == LinkOrigin::Internal);

        // sort_by is stable
        internal.sort_by(|a, b| b.score.cmp(&a.score));
        external.sort_by(|a, b| b.score.cmp(&a.score));
        internal.truncate(max_links);
        external.truncate(max_links);

        LinkSample {
            internal: dedupe_by_href(internal),
            external: dedupe_by_href(external),
        }
    }

    /// Probes every sampled link on a bounded pool of `workers` concurrent
    /// requests and folds the outcomes once all of them have completed.
    pub async fn validate(
        &self,
        sample: LinkSample,
        progress: Option<&ProgressBar>,
    ) -> (LinksReport, Recommendations) {
        let internal_count = sample.internal.len();
        let external_count = sample.external.len();

        if sample.is_empty() {
            return aggregate(internal_count, external_count, vec![]);
        }

        tracing::info!(
            internal = internal_count,
            external = external_count,
            workers = self.workers,
            "Validating sampled links"
        );

        let results: Vec<(LinkCandidate, ProbeResult)> =
            stream::iter(sample.internal.into_iter().chain(sample.external))
                .map(|candidate| async move {
                    let result = self.probe(&candidate.href).await;
                    (candidate, result)
                })
                .buffer_unordered(self.workers)
                .inspect(|_| {
                    if let Some(pb) = progress {
                        pb.inc(1);
                    }
                })
                .collect()
                .await;

        aggregate(internal_count, external_count, results)
    }

    /// HEAD first; on any error status (which covers servers answering HEAD
    /// with 405/501) retry once with GET. Unreachable links report 0.
    pub async fn probe(&self, url: &str) -> ProbeResult {
        let start = Instant::now();

        let status = match self.client.head(url).send().await {
            Ok(response) if response.status().as_u16() < 400 => response.status().as_u16(),
            Ok(_) => match self.client.get(url).send().await {
                Ok(response) => response.status().as_u16(),
                Err(e) => {
                    tracing::debug!(url = %url, error = %e, "GET fallback failed");
                    0
                }
            },
            Err(e) => {
                tracing::debug!(url = %url, error = %e, "HEAD request failed");
                0
            }
        };

        let elapsed_ms = start.elapsed().as_millis() as u64;
        tracing::debug!(url = %url, status = status, elapsed_ms = elapsed_ms, "Link probed");
        ProbeResult { status, elapsed_ms }
    }
}

/// Importance used only for sampling order; higher is checked first
pub fn importance_score(anchor: &ElementRef, href_lowercase: &str) -> i32 {
    let mut in_nav = false;
    let mut in_content = false;
    let mut in_header = false;
    let mut in_footer = false;

    for ancestor in anchor.ancestors().filter_map(ElementRef::wrap) {
        match ancestor.value().name() {
            "nav" => in_nav = true,
            "main" | "article" => in_content = true,
            "header" => in_header = true,
            "footer" => in_footer = true,
            _ => {}
        }
    }

    let mut score = 0;
    if in_nav {
        score += 10;
    }
    if in_content {
        score += 8;
    }
    if in_header {
        score += 6;
    }
    if in_footer {
        score += 4;
    }
    if LOW_VALUE_MARKERS.iter().any(|m| href_lowercase.contains(m)) {
        score -= 5;
    }

    let text_len = anchor
        .text()
        .map(str::trim)
        .collect::<String>()
        .chars()
        .count();
    if text_len > 3 && text_len < 50 {
        score += 2;
    }

    score
}

/// Internal when the link shares the audited page's host and effective port
pub fn classify_origin(page_url: &Url, link: &Url) -> LinkOrigin {
    match (host_key(page_url), host_key(link)) {
        (Some(page), Some(other)) if page == other => LinkOrigin::Internal,
        _ => LinkOrigin::External,
    }
}

pub fn classify_outcome(status: u16, origin: LinkOrigin) -> LinkClassification {
    match status {
        0 | 400.. => match origin {
            LinkOrigin::Internal => LinkClassification::BrokenInternal,
            LinkOrigin::External => LinkClassification::BrokenExternal,
        },
        300..400 => LinkClassification::Redirect,
        _ => LinkClassification::Ok,
    }
}

/// Buckets probe results in completion order and emits one recommendation
/// per non-empty bucket carrying the bucket's full count.
pub fn aggregate(
    internal_count: usize,
    external_count: usize,
    results: Vec<(LinkCandidate, ProbeResult)>,
) -> (LinksReport, Recommendations) {
    let mut broken_internal = Bucket::default();
    let mut broken_external = Bucket::default();
    let mut redirects = Bucket::default();

    for (candidate, result) in results {
        let classification = classify_outcome(result.status, candidate.origin);
        let bucket = match classification {
            LinkClassification::BrokenInternal => &mut broken_internal,
            LinkClassification::BrokenExternal => &mut broken_external,
            LinkClassification::Redirect => &mut redirects,
            LinkClassification::Ok => continue,
        };
        bucket.push(LinkOutcome {
            url: candidate.href,
            status: result.status,
            elapsed_ms: result.elapsed_ms,
            classification,
        });
    }

    let mut recommendations = Recommendations::new();
    if !broken_internal.is_empty() {
        recommendations.push(format!(
            "{} internal links appear broken.",
            broken_internal.len()
        ));
    }
    if !broken_external.is_empty() {
        recommendations.push(format!(
            "{} external links appear broken.",
            broken_external.len()
        ));
    }
    if !redirects.is_empty() {
        recommendations.push(format!(
            "{} links redirect; update to final URLs where possible.",
            redirects.len()
        ));
    }

    let report = LinksReport {
        internal_count,
        external_count,
        broken_internal_total: broken_internal.len(),
        broken_external_total: broken_external.len(),
        redirects_total: redirects.len(),
        broken_internal: broken_internal.into_reported(),
        broken_external: broken_external.into_reported(),
        redirects: redirects.into_reported(),
    };

    (report, recommendations)
}

fn dedupe_by_href(candidates: Vec<LinkCandidate>) -> Vec<LinkCandidate> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|c| seen.insert(c.href.clone()))
        .collect()
}

/// Outcome list that ignores repeated URLs
#[derive(Default)]
struct Bucket {
    seen: HashSet<String>,
    outcomes: Vec<LinkOutcome>,
}

impl Bucket {
    fn push(&mut self, outcome: LinkOutcome) {
        if self.seen.insert(outcome.url.clone()) {
            self.outcomes.push(outcome);
        }
    }

    fn len(&self) -> usize {
        self.outcomes.len()
    }

    fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    fn into_reported(mut self) -> Vec<LinkOutcome> {
        self.outcomes.truncate(MAX_REPORTED_OUTCOMES);
        self.outcomes
    }
}
