use seoaudit::auditor::FetchFailure;
use seoaudit::models::{
    AuditReport, AuditSections, LinkClassification, LinkOutcome, LinksReport, OnPage, Presence,
    Recommendations, RobotsSitemap, RunMetadata, SocialStructured, TechnicalSignals,
};
use seoaudit::reporter::Reporter;
use seoaudit::scorer::Scorer;
use seoaudit::target::AuditTarget;
use std::fs;
use std::time::Duration;
use tempfile::tempdir;

fn run_metadata() -> RunMetadata {
    RunMetadata {
        analysis_time: 1.25,
        workers_used: 10,
        fast_mode: false,
        generated_at: "2026-01-01T00:00:00+00:00".to_string(),
    }
}

fn full_report() -> AuditReport {
    let target = AuditTarget::new("example.com");
    let sections = AuditSections {
        on_page: OnPage {
            title: Some("A".repeat(90)),
            h1_tags: vec!["Heading".to_string()],
            has_viewport_meta: true,
            images_missing_alt: vec!["/a.png".to_string(), "/b.png".to_string()],
            canonical: Some("https://example.com/".to_string()),
            ..Default::default()
        },
        social_structured: SocialStructured {
            open_graph: true,
            twitter_card: false,
            json_ld_blocks: 2,
            json_ld_errors: 1,
        },
        links: LinksReport {
            internal_count: 12,
            external_count: 3,
            broken_internal: vec![LinkOutcome {
                url: "https://example.com/missing".to_string(),
                status: 404,
                elapsed_ms: 85,
                classification: LinkClassification::BrokenInternal,
            }],
            broken_internal_total: 1,
            ..Default::default()
        },
        technical: TechnicalSignals {
            status_code: 200,
            response_time_ms: 340,
            content_length: 51_200,
            ..Default::default()
        },
        robots_sitemap: RobotsSitemap {
            robots_txt: Presence::Present,
            sitemap: Presence::Missing,
            robots_notes: vec![],
        },
    };

    let mut recommendations = Recommendations::new();
    for i in 1..=7 {
        recommendations.push(format!("Recommendation {}", i));
    }
    let score = Scorer::score(&sections, target.is_https());
    AuditReport::assemble(&target, sections, recommendations, score, run_metadata())
}

#[test]
fn test_build_summary_of_full_report() {
    let report = full_report();
    let summary = Reporter::build_summary(&report);

    assert_eq!(summary.url, "https://example.com");
    assert_eq!(summary.score, report.score().overall);
    assert_eq!(summary.status.code, Some(200));
    assert_eq!(summary.status.response_time_ms, 340);
    assert_eq!(summary.status.size_bytes, Some(51_200));

    let title = summary.on_page.title.unwrap();
    assert_eq!(title.chars().count(), 70);
    assert!(title.ends_with('…'));
    assert_eq!(summary.on_page.h1_count, 1);
    assert_eq!(summary.on_page.images_missing_alt, 2);
    assert!(summary.on_page.canonical_present);

    assert_eq!(summary.links.internal_checked, 12);
    assert_eq!(summary.links.external_checked, 3);
    assert_eq!(summary.links.broken_internal, 1);
    assert_eq!(summary.social_structured.json_ld_errors, 1);
    assert_eq!(summary.robots_sitemap.robots_txt, Some(Presence::Present));
    assert_eq!(summary.robots_sitemap.sitemap, Some(Presence::Missing));

    assert_eq!(summary.top_recommendations.len(), 5);
    assert_eq!(summary.top_recommendations[0], "Recommendation 1");
    assert_eq!(summary.top_recommendations[4], "Recommendation 5");
}

#[test]
fn test_build_summary_of_failure_report() {
    let target = AuditTarget::new("http://127.0.0.1:1");
    let report = AuditReport::failure(
        &target,
        FetchFailure::Unreachable {
            error: "connection refused".to_string(),
        },
        Duration::from_millis(12),
        run_metadata(),
    );
    let summary = Reporter::build_summary(&report);

    assert_eq!(summary.score, 0);
    assert_eq!(summary.status.code, None);
    assert_eq!(summary.status.response_time_ms, 12);
    assert_eq!(summary.status.size_bytes, None);
    assert_eq!(summary.on_page.title, None);
    assert_eq!(summary.robots_sitemap.robots_txt, None);
    assert_eq!(
        summary.top_recommendations,
        vec!["Could not fetch website: connection refused".to_string()]
    );
}

#[test]
fn test_report_json_shape() {
    let report = full_report();
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["url"], "https://example.com");
    assert_eq!(json["technical"]["status_code"], 200);
    assert_eq!(json["robots_sitemap"]["sitemap"], "Missing");
    assert_eq!(json["links"]["broken_internal"][0]["classification"], "broken_internal");
    assert_eq!(json["links"]["broken_internal"][0]["elapsed_ms"], 85);
    // Run metadata is flattened into the top level
    assert_eq!(json["workers_used"], 10);
    assert_eq!(json["analysis_time"], 1.25);
    assert_eq!(json["generated_at"], "2026-01-01T00:00:00+00:00");
}

#[test]
fn test_save_json_report() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("report.json");
    let report = full_report();

    Reporter::save_json_report(&report, path.to_str().unwrap()).unwrap();

    let saved = fs::read_to_string(&path).unwrap();
    let parsed: AuditReport = serde_json::from_str(&saved).unwrap();
    assert_eq!(parsed, report);
}

#[test]
fn test_save_json_report_to_missing_directory_fails() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("no-such-dir").join("report.json");
    let result = Reporter::save_json_report(&full_report(), path.to_str().unwrap());
    assert!(result.is_err());
}

#[test]
fn test_print_text_report_does_not_panic() {
    Reporter::print_text_report(&full_report());

    let target = AuditTarget::new("https://example.com");
    let failure = AuditReport::failure(
        &target,
        FetchFailure::HttpStatus { status_code: 503 },
        Duration::from_millis(80),
        run_metadata(),
    );
    Reporter::print_text_report(&failure);
}
