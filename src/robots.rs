use crate::http_client::{PROBE_TIMEOUT, build_http_client};
use crate::models::{Presence, Recommendations, RobotsSitemap};
use crate::target::AuditTarget;
use anyhow::Result;

/// Checks the two well-known crawler files at the site root.
///
/// Anything other than HTTP 200, including network failures, counts as
/// missing.
pub struct RobotsProber {
    client: reqwest::Client,
}

impl RobotsProber {
    pub fn new() -> Result<Self> {
        Ok(Self::with_client(build_http_client(PROBE_TIMEOUT)?))
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub async fn probe(&self, target: &AuditTarget) -> (RobotsSitemap, Recommendations) {
        let robots_url = target.well_known("/robots.txt");
        let sitemap_url = target.well_known("/sitemap.xml");

        let (robots_body, sitemap_found) = tokio::join!(
            self.fetch_text(robots_url.as_deref()),
            self.exists(sitemap_url.as_deref())
        );

        let mut recommendations = Recommendations::new();
        let mut info = RobotsSitemap {
            robots_txt: Presence::Missing,
            sitemap: Presence::Missing,
            robots_notes: vec![],
        };

        match robots_body {
            Some(content) => {
                info.robots_txt = Presence::Present;
                info.robots_notes = robots_notes(&content);
            }
            None => recommendations.push("Missing robots.txt file."),
        }

        if sitemap_found {
            info.sitemap = Presence::Present;
        } else {
            recommendations.push("Missing sitemap.xml file.");
        }

        (info, recommendations)
    }

    async fn fetch_text(&self, url: Option<&str>) -> Option<String> {
        let url = url?;
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::info!(url = %url, error = %e, "robots.txt unreachable");
                return None;
            }
        };

        if response.status().as_u16() != 200 {
            tracing::info!(url = %url, status = %response.status(), "robots.txt not found");
            return None;
        }

        match response.text().await {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::info!(url = %url, error = %e, "Failed to read robots.txt");
                None
            }
        }
    }

    async fn exists(&self, url: Option<&str>) -> bool {
        let Some(url) = url else {
            return false;
        };
        match self.client.get(url).send().await {
            Ok(response) => {
                tracing::info!(url = %url, status = %response.status(), "Sitemap probed");
                response.status().as_u16() == 200
            }
            Err(e) => {
                tracing::info!(url = %url, error = %e, "sitemap.xml unreachable");
                false
            }
        }
    }
}

/// Advisory notes about a present robots.txt; these are never scored
pub fn robots_notes(content: &str) -> Vec<String> {
    let mut notes = Vec::new();
    if !content.contains("Disallow:") && !content.contains("Allow:") {
        notes.push("robots.txt seems permissive (no explicit rules).".to_string());
    }
    if content.contains("Sitemap:") {
        notes.push("robots.txt references a sitemap.".to_string());
    }
    notes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permissive_robots() {
        let notes = robots_notes("User-agent: *\n");
        assert_eq!(
            notes,
            vec!["robots.txt seems permissive (no explicit rules).".to_string()]
        );
    }

    #[test]
    fn test_robots_with_rules_and_sitemap() {
        let content = r#"
User-agent: *
Disallow: /admin
Sitemap: https://example.com/sitemap.xml
"#;
        let notes = robots_notes(content);
        assert_eq!(notes, vec!["robots.txt references a sitemap.".to_string()]);
    }

    #[test]
    fn test_allow_only_is_not_permissive() {
        let notes = robots_notes("User-agent: *\nAllow: /\n");
        assert!(notes.is_empty());
    }
}
