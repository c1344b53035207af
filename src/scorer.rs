use crate::models::{AuditSections, Deduction, ScoreBreakdown};
use crate::technical::{LARGE_PAGE_BYTES, SLOW_RESPONSE_MS};

pub const MAX_SCORE: u32 = 100;

/// Point values for each scored condition. These are the compatibility
/// contract of the score and must not be re-weighted.
pub mod weights {
    pub const TITLE: u32 = 5;
    pub const META_DESCRIPTION: u32 = 5;
    pub const H1: u32 = 5;
    pub const IMAGES_MISSING_ALT: u32 = 3;
    pub const CANONICAL: u32 = 2;
    pub const VIEWPORT: u32 = 2;
    pub const NOINDEX: u32 = 10;
    pub const OPEN_GRAPH: u32 = 2;
    pub const TWITTER_CARD: u32 = 1;
    pub const JSON_LD: u32 = 2;
    pub const BROKEN_INTERNAL: u32 = 5;
    pub const BROKEN_EXTERNAL: u32 = 2;
    pub const SLOW_TTFB: u32 = 5;
    pub const LARGE_PAGE: u32 = 4;
    pub const HSTS: u32 = 2;
    pub const SECURITY_HEADER: u32 = 1;
    pub const ROBOTS_TXT: u32 = 2;
    pub const SITEMAP: u32 = 2;
}

/// Images missing alt text are only penalized above this count
pub const IMAGES_MISSING_ALT_THRESHOLD: usize = 5;
/// Broken external links are only penalized above this count
pub const BROKEN_EXTERNAL_THRESHOLD: usize = 3;

/// Folds already computed findings into a 0-100 score
pub struct Scorer {
    deductions: Vec<Deduction>,
}

impl Scorer {
    pub fn score(sections: &AuditSections, is_https: bool) -> ScoreBreakdown {
        let mut scorer = Scorer { deductions: vec![] };

        let on_page = &sections.on_page;
        scorer.deduct_if(!on_page.title_info.issues.is_empty(), weights::TITLE, "Title issues");
        scorer.deduct_if(
            !on_page.meta_description_info.issues.is_empty(),
            weights::META_DESCRIPTION,
            "Meta description issues",
        );
        scorer.deduct_if(!on_page.h1_info.issues.is_empty(), weights::H1, "H1 count issues");
        scorer.deduct_if(
            on_page.images_missing_alt.len() > IMAGES_MISSING_ALT_THRESHOLD,
            weights::IMAGES_MISSING_ALT,
            "Many images missing alt",
        );
        scorer.deduct_if(
            !on_page.canonical_info.issues.is_empty(),
            weights::CANONICAL,
            "Canonical issues",
        );
        scorer.deduct_if(!on_page.has_viewport_meta, weights::VIEWPORT, "Missing viewport");
        scorer.deduct_if(on_page.meta_robots.noindex, weights::NOINDEX, "noindex set");

        let social = &sections.social_structured;
        scorer.deduct_if(!social.open_graph, weights::OPEN_GRAPH, "Missing Open Graph");
        scorer.deduct_if(!social.twitter_card, weights::TWITTER_CARD, "Missing Twitter Card");
        scorer.deduct_if(social.json_ld_errors > 0, weights::JSON_LD, "Invalid JSON-LD");

        let links = &sections.links;
        scorer.deduct_if(
            links.broken_internal_total > 0,
            weights::BROKEN_INTERNAL,
            "Broken internal links",
        );
        scorer.deduct_if(
            links.broken_external_total > BROKEN_EXTERNAL_THRESHOLD,
            weights::BROKEN_EXTERNAL,
            "Multiple broken external links",
        );

        let tech = &sections.technical;
        scorer.deduct_if(tech.response_time_ms > SLOW_RESPONSE_MS, weights::SLOW_TTFB, "Slow TTFB");
        scorer.deduct_if(
            tech.content_length > LARGE_PAGE_BYTES,
            weights::LARGE_PAGE,
            "Large page size",
        );
        scorer.deduct_if(is_https && !tech.hsts, weights::HSTS, "Missing HSTS");
        scorer.deduct_if(
            !tech.x_content_type_options,
            weights::SECURITY_HEADER,
            "Missing X-Content-Type-Options",
        );
        scorer.deduct_if(
            !tech.x_frame_options,
            weights::SECURITY_HEADER,
            "Missing X-Frame-Options",
        );
        scorer.deduct_if(
            !tech.referrer_policy,
            weights::SECURITY_HEADER,
            "Missing Referrer-Policy",
        );
        scorer.deduct_if(!tech.csp, weights::SECURITY_HEADER, "Missing CSP");

        let robots = &sections.robots_sitemap;
        scorer.deduct_if(
            !robots.robots_txt.is_present(),
            weights::ROBOTS_TXT,
            "Missing robots.txt",
        );
        scorer.deduct_if(!robots.sitemap.is_present(), weights::SITEMAP, "Missing sitemap.xml");

        scorer.finish()
    }

    /// Score for a page that could not be audited at all
    pub fn critical(reason: &str) -> ScoreBreakdown {
        ScoreBreakdown {
            overall: 0,
            deductions: vec![Deduction {
                points: MAX_SCORE,
                reason: format!("Critical: {}", reason),
            }],
        }
    }

    fn deduct_if(&mut self, condition: bool, points: u32, reason: &str) {
        if condition {
            self.deductions.push(Deduction {
                points,
                reason: reason.to_string(),
            });
        }
    }

    fn finish(self) -> ScoreBreakdown {
        let total: u32 = self.deductions.iter().map(|d| d.points).sum();
        ScoreBreakdown {
            overall: MAX_SCORE.saturating_sub(total),
            deductions: self.deductions,
        }
    }
}
