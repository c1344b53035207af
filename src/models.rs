use crate::scorer::Scorer;
use crate::target::AuditTarget;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Ordered, append-only list of findings produced during one audit run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Recommendations(Vec<String>);

impl Recommendations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, recommendation: impl Into<String>) {
        self.0.push(recommendation.into());
    }

    /// Appends another batch, preserving its order after the current entries
    pub fn extend(&mut self, other: Recommendations) {
        self.0.extend(other.0);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn contains(&self, recommendation: &str) -> bool {
        self.0.iter().any(|r| r == recommendation)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleInfo {
    pub length: usize,
    pub issues: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaDescriptionInfo {
    pub length: usize,
    pub issues: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct H1Info {
    pub count: usize,
    pub issues: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagesInfo {
    pub total: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalInfo {
    pub issues: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaRobots {
    /// Raw `content` of the robots meta tag, if any
    pub content: Option<String>,
    pub noindex: bool,
    pub nofollow: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LangCharset {
    pub lang: Option<String>,
    pub charset: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hreflang {
    pub hreflang: String,
    pub href: String,
}

/// On-page signals extracted from the document body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnPage {
    pub title: Option<String>,
    pub title_info: TitleInfo,
    pub meta_description: Option<String>,
    pub meta_description_info: MetaDescriptionInfo,
    pub h1_tags: Vec<String>,
    pub h1_info: H1Info,
    /// `src` of every image whose alt text is absent or blank
    pub images_missing_alt: Vec<String>,
    pub images_info: ImagesInfo,
    pub canonical: Option<String>,
    pub canonical_info: CanonicalInfo,
    pub has_viewport_meta: bool,
    pub meta_robots: MetaRobots,
    pub lang_charset: LangCharset,
    pub hreflang: Vec<Hreflang>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialStructured {
    pub open_graph: bool,
    pub twitter_card: bool,
    pub json_ld_blocks: usize,
    pub json_ld_errors: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkOrigin {
    Internal,
    External,
}

/// A link found on the page, ranked for sampling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkCandidate {
    pub href: String,
    pub origin: LinkOrigin,
    pub score: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkClassification {
    BrokenInternal,
    BrokenExternal,
    Redirect,
    Ok,
}

/// Status and timing of a single link check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeResult {
    /// Final HTTP status, 0 when the link was unreachable
    pub status: u16,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkOutcome {
    pub url: String,
    /// Final HTTP status, 0 when the link was unreachable
    pub status: u16,
    pub elapsed_ms: u64,
    pub classification: LinkClassification,
}

/// Link validation results. Outcome lists hold at most the first
/// ten entries of each bucket; the `*_total` fields keep the full counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinksReport {
    pub internal_count: usize,
    pub external_count: usize,
    pub broken_internal: Vec<LinkOutcome>,
    pub broken_external: Vec<LinkOutcome>,
    pub redirects: Vec<LinkOutcome>,
    pub broken_internal_total: usize,
    pub broken_external_total: usize,
    pub redirects_total: usize,
}

/// Header-derived signals for a successfully fetched page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechnicalSignals {
    pub status_code: u16,
    pub response_time_ms: u64,
    pub content_length: u64,
    pub gzip: bool,
    pub hsts: bool,
    pub x_content_type_options: bool,
    pub x_frame_options: bool,
    pub referrer_policy: bool,
    pub csp: bool,
    pub server: Option<String>,
    pub cache_control: Option<String>,
}

/// The technical section is either the full signal set or, for a failure
/// report, only what is known about the failed fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TechnicalSection {
    Signals(TechnicalSignals),
    HttpError {
        status_code: u16,
        response_time_ms: u64,
    },
    Unreachable {
        error: String,
        response_time_ms: u64,
    },
}

impl TechnicalSection {
    pub fn signals(&self) -> Option<&TechnicalSignals> {
        match self {
            TechnicalSection::Signals(signals) => Some(signals),
            _ => None,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            TechnicalSection::Signals(signals) => Some(signals.status_code),
            TechnicalSection::HttpError { status_code, .. } => Some(*status_code),
            TechnicalSection::Unreachable { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            TechnicalSection::Unreachable { error, .. } => Some(error),
            _ => None,
        }
    }

    pub fn response_time_ms(&self) -> u64 {
        match self {
            TechnicalSection::Signals(signals) => signals.response_time_ms,
            TechnicalSection::HttpError {
                response_time_ms, ..
            }
            | TechnicalSection::Unreachable {
                response_time_ms, ..
            } => *response_time_ms,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Presence {
    Present,
    Missing,
}

impl Presence {
    pub fn is_present(self) -> bool {
        self == Presence::Present
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RobotsSitemap {
    pub robots_txt: Presence,
    pub sitemap: Presence,
    pub robots_notes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deduction {
    pub points: u32,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub overall: u32,
    pub deductions: Vec<Deduction>,
}

/// Every detail section of a full report. Constructing one requires
/// all sections, so a full report can never be partially populated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditSections {
    pub on_page: OnPage,
    pub social_structured: SocialStructured,
    pub links: LinksReport,
    pub technical: TechnicalSignals,
    pub robots_sitemap: RobotsSitemap,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    /// Wall-clock seconds spent on the whole audit
    pub analysis_time: f64,
    pub workers_used: usize,
    pub fast_mode: bool,
    pub generated_at: String,
}

/// Why a page could not be audited
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    Unreachable { error: String },
    HttpStatus { status_code: u16 },
}

/// The single artifact handed to renderers and persistence.
///
/// Fields are private: a report is either fully populated through
/// [`AuditReport::assemble`] or a failure report from
/// [`AuditReport::failure`], and is read through its accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditReport {
    url: String,
    on_page: Option<OnPage>,
    social_structured: Option<SocialStructured>,
    links: Option<LinksReport>,
    technical: TechnicalSection,
    robots_sitemap: Option<RobotsSitemap>,
    recommendations: Vec<String>,
    score: ScoreBreakdown,
    #[serde(flatten)]
    run: RunMetadata,
}

impl AuditReport {
    /// Builds a full report from every detail section
    pub fn assemble(
        target: &AuditTarget,
        sections: AuditSections,
        recommendations: Recommendations,
        score: ScoreBreakdown,
        run: RunMetadata,
    ) -> Self {
        AuditReport {
            url: target.url.clone(),
            on_page: Some(sections.on_page),
            social_structured: Some(sections.social_structured),
            links: Some(sections.links),
            technical: TechnicalSection::Signals(sections.technical),
            robots_sitemap: Some(sections.robots_sitemap),
            recommendations: recommendations.into_vec(),
            score,
            run,
        }
    }

    /// Builds a failure report: no detail sections, a single
    /// recommendation and a score of 0
    pub fn failure(
        target: &AuditTarget,
        failure: FetchFailure,
        elapsed: Duration,
        run: RunMetadata,
    ) -> Self {
        let response_time_ms = elapsed.as_millis() as u64;
        let (technical, recommendation, score) = match failure {
            FetchFailure::Unreachable { error } => (
                TechnicalSection::Unreachable {
                    error: error.clone(),
                    response_time_ms,
                },
                format!("Could not fetch website: {}", error),
                Scorer::critical("site unreachable"),
            ),
            FetchFailure::HttpStatus { status_code } => (
                TechnicalSection::HttpError {
                    status_code,
                    response_time_ms,
                },
                format!(
                    "Website returned status code {}. Check server health.",
                    status_code
                ),
                Scorer::critical("HTTP error"),
            ),
        };

        AuditReport {
            url: target.url.clone(),
            on_page: None,
            social_structured: None,
            links: None,
            technical,
            robots_sitemap: None,
            recommendations: vec![recommendation],
            score,
            run,
        }
    }

    pub fn is_failure(&self) -> bool {
        self.technical.signals().is_none()
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn on_page(&self) -> Option<&OnPage> {
        self.on_page.as_ref()
    }

    pub fn social_structured(&self) -> Option<&SocialStructured> {
        self.social_structured.as_ref()
    }

    pub fn links(&self) -> Option<&LinksReport> {
        self.links.as_ref()
    }

    pub fn technical(&self) -> &TechnicalSection {
        &self.technical
    }

    pub fn robots_sitemap(&self) -> Option<&RobotsSitemap> {
        self.robots_sitemap.as_ref()
    }

    pub fn recommendations(&self) -> &[String] {
        &self.recommendations
    }

    pub fn score(&self) -> &ScoreBreakdown {
        &self.score
    }

    pub fn run(&self) -> &RunMetadata {
        &self.run
    }
}
