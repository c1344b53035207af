use reqwest::header::{HeaderMap, HeaderValue};
use scraper::Html;
use seoaudit::models::{
    AuditSections, LinksReport, OnPage, Presence, Recommendations, RobotsSitemap,
    SocialStructured, TechnicalSignals,
};
use seoaudit::scorer::{MAX_SCORE, Scorer};
use seoaudit::seo_analyzer::SeoAnalyzer;
use seoaudit::technical;
use std::time::Duration;
use url::Url;

fn clean_on_page() -> OnPage {
    OnPage {
        has_viewport_meta: true,
        ..Default::default()
    }
}

fn clean_technical() -> TechnicalSignals {
    TechnicalSignals {
        status_code: 200,
        response_time_ms: 120,
        content_length: 10_000,
        gzip: true,
        hsts: true,
        x_content_type_options: true,
        x_frame_options: true,
        referrer_policy: true,
        csp: true,
        ..Default::default()
    }
}

fn clean_sections() -> AuditSections {
    AuditSections {
        on_page: clean_on_page(),
        social_structured: SocialStructured {
            open_graph: true,
            twitter_card: true,
            json_ld_blocks: 1,
            json_ld_errors: 0,
        },
        links: LinksReport::default(),
        technical: clean_technical(),
        robots_sitemap: RobotsSitemap {
            robots_txt: Presence::Present,
            sitemap: Presence::Present,
            robots_notes: vec![],
        },
    }
}

#[test]
fn test_clean_page_scores_full_marks() {
    let score = Scorer::score(&clean_sections(), true);
    assert_eq!(score.overall, MAX_SCORE);
    assert!(score.deductions.is_empty());
}

#[test]
fn test_hsts_only_counts_for_https() {
    let mut sections = clean_sections();
    sections.technical.hsts = false;

    assert_eq!(Scorer::score(&sections, false).overall, 100);
    let score = Scorer::score(&sections, true);
    assert_eq!(score.overall, 98);
    assert_eq!(score.deductions[0].reason, "Missing HSTS");
}

#[test]
fn test_thresholds() {
    let mut sections = clean_sections();
    sections.on_page.images_missing_alt = vec!["/a.png".to_string(); 5];
    sections.links.broken_external_total = 3;
    sections.technical.response_time_ms = 1500;
    sections.technical.content_length = 2 * 1024 * 1024;
    assert_eq!(Scorer::score(&sections, true).overall, 100);

    sections.on_page.images_missing_alt.push("/b.png".to_string());
    sections.links.broken_external_total = 4;
    sections.technical.response_time_ms = 1501;
    sections.technical.content_length += 1;
    let score = Scorer::score(&sections, true);
    let reasons: Vec<_> = score.deductions.iter().map(|d| d.reason.as_str()).collect();
    assert_eq!(
        reasons,
        vec![
            "Many images missing alt",
            "Multiple broken external links",
            "Slow TTFB",
            "Large page size",
        ]
    );
    assert_eq!(score.overall, 100 - 3 - 2 - 5 - 4);
}

#[test]
fn test_score_is_clamped_at_zero() {
    let sections = AuditSections {
        on_page: OnPage {
            title_info: seoaudit::models::TitleInfo {
                length: 0,
                issues: vec!["Missing title".to_string()],
            },
            ..Default::default()
        },
        social_structured: SocialStructured {
            json_ld_errors: 2,
            ..Default::default()
        },
        links: LinksReport {
            broken_internal_total: 4,
            broken_external_total: 9,
            ..Default::default()
        },
        technical: TechnicalSignals {
            response_time_ms: 9_000,
            content_length: 50 * 1024 * 1024,
            ..Default::default()
        },
        robots_sitemap: RobotsSitemap {
            robots_txt: Presence::Missing,
            sitemap: Presence::Missing,
            robots_notes: vec![],
        },
    };

    let mut sections = sections;
    sections.on_page.meta_robots.noindex = true;
    sections.on_page.images_missing_alt = vec!["x".to_string(); 10];

    let score = Scorer::score(&sections, true);
    let total: u32 = score.deductions.iter().map(|d| d.points).sum();
    assert!(score.overall <= MAX_SCORE);
    assert_eq!(score.overall, MAX_SCORE.saturating_sub(total));
}

#[test]
fn test_critical_score() {
    let score = Scorer::critical("site unreachable");
    assert_eq!(score.overall, 0);
    assert_eq!(score.deductions.len(), 1);
    assert_eq!(score.deductions[0].points, 100);
    assert_eq!(score.deductions[0].reason, "Critical: site unreachable");
}

#[test]
fn test_scenario_missing_title_description_and_hsts() {
    let html = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width">
    <link rel="canonical" href="https://example.com/">
    <meta property="og:title" content="Example">
    <meta name="twitter:card" content="summary">
</head>
<body>
    <h1>First</h1>
    <h1>Second</h1>
    <img src="/hero.png">
</body>
</html>"#;
    let page_url = Url::parse("https://example.com/").unwrap();
    let mut recommendations = Recommendations::new();

    let (on_page, social_structured) = {
        let document = Html::parse_document(html);
        (
            SeoAnalyzer::analyze(&document, &page_url, &mut recommendations),
            SeoAnalyzer::analyze_social(&document, &mut recommendations),
        )
    };

    let mut headers = HeaderMap::new();
    headers.insert("x-content-type-options", HeaderValue::from_static("nosniff"));
    headers.insert("x-frame-options", HeaderValue::from_static("SAMEORIGIN"));
    headers.insert("referrer-policy", HeaderValue::from_static("same-origin"));
    headers.insert(
        "content-security-policy",
        HeaderValue::from_static("default-src 'self'"),
    );
    let technical = technical::analyze_headers(
        200,
        &headers,
        Duration::from_millis(200),
        4_000,
        true,
        &mut recommendations,
    );
    recommendations.push("Missing sitemap.xml file.");

    let sections = AuditSections {
        on_page,
        social_structured,
        links: LinksReport::default(),
        technical,
        robots_sitemap: RobotsSitemap {
            robots_txt: Presence::Present,
            sitemap: Presence::Missing,
            robots_notes: vec![],
        },
    };

    for expected in [
        "Missing <title> tag.",
        "Add a unique meta description (120-160 characters).",
        "Use only one primary H1 heading per page.",
        "1 images missing alt text.",
        "Enable HSTS for better transport security.",
        "Missing sitemap.xml file.",
    ] {
        assert!(recommendations.contains(expected), "missing: {}", expected);
    }

    let score = Scorer::score(&sections, true);
    assert_eq!(score.overall, 81);
    let reasons: Vec<_> = score.deductions.iter().map(|d| d.reason.as_str()).collect();
    assert_eq!(
        reasons,
        vec![
            "Title issues",
            "Meta description issues",
            "H1 count issues",
            "Missing HSTS",
            "Missing sitemap.xml",
        ]
    );
}
