use crate::models::{
    CanonicalInfo, H1Info, Hreflang, ImagesInfo, LangCharset, MetaDescriptionInfo, MetaRobots,
    OnPage, Recommendations, SocialStructured, TitleInfo,
};
use crate::target::host_key;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use url::Url;

pub const TITLE_MIN_LENGTH: usize = 30;
pub const TITLE_MAX_LENGTH: usize = 60;
pub const META_DESCRIPTION_MIN_LENGTH: usize = 50;
pub const META_DESCRIPTION_MAX_LENGTH: usize = 160;

// Cached selectors to avoid repeated parsing and eliminate unwrap() calls
static TITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("title").expect("title selector should be valid"));
static META_DESC_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("meta[name='description']").expect("meta description selector should be valid")
});
static H1_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h1").expect("h1 selector should be valid"));
static IMG_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("img").expect("img selector should be valid"));
static LINK_REL_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("link[rel]").expect("link[rel] selector should be valid"));
static VIEWPORT_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("meta[name='viewport']").expect("viewport selector should be valid")
});
static ROBOTS_META_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("meta[name='robots']").expect("robots meta selector should be valid")
});
static HTML_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("html").expect("html selector should be valid"));
static META_CHARSET_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("meta[charset]").expect("meta charset selector should be valid")
});
static META_HTTP_EQUIV_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("meta[http-equiv]").expect("meta http-equiv selector should be valid")
});
static OG_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("meta[property^='og:']").expect("open graph selector should be valid")
});
static TWITTER_CARD_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("meta[name='twitter:card']").expect("twitter card selector should be valid")
});
static SCRIPT_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("script[type]").expect("script selector should be valid"));

/// Runs the on-page checks against an already parsed document.
///
/// Every check is total: it always yields a result and only ever appends
/// to `recommendations`, in a fixed order.
pub struct SeoAnalyzer;

impl SeoAnalyzer {
    pub fn analyze(document: &Html, page_url: &Url, recommendations: &mut Recommendations) -> OnPage {
        let (title, title_info) = Self::check_title(document, recommendations);
        let (meta_description, meta_description_info) =
            Self::check_meta_description(document, recommendations);
        let (h1_tags, h1_info) = Self::check_h1(document, recommendations);
        let (images_missing_alt, images_info) = Self::check_images(document, recommendations);
        let (canonical, canonical_info) =
            Self::check_canonical(document, page_url, recommendations);
        let has_viewport_meta = Self::check_viewport(document, recommendations);
        let meta_robots = Self::check_meta_robots(document, recommendations);
        let lang_charset = Self::check_lang_and_charset(document, recommendations);
        let hreflang = Self::check_hreflang(document, page_url, recommendations);

        OnPage {
            title,
            title_info,
            meta_description,
            meta_description_info,
            h1_tags,
            h1_info,
            images_missing_alt,
            images_info,
            canonical,
            canonical_info,
            has_viewport_meta,
            meta_robots,
            lang_charset,
            hreflang,
        }
    }

    pub fn check_title(
        document: &Html,
        recommendations: &mut Recommendations,
    ) -> (Option<String>, TitleInfo) {
        let mut info = TitleInfo::default();
        let title = document
            .select(&TITLE_SELECTOR)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty());

        let Some(title) = title else {
            recommendations.push("Missing <title> tag.");
            info.issues.push("Missing title".to_string());
            return (None, info);
        };

        info.length = title.chars().count();
        if info.length < TITLE_MIN_LENGTH {
            info.issues.push("Title too short (<30 chars)".to_string());
            recommendations.push("Increase title length to ~50-60 characters.");
        }
        if info.length > TITLE_MAX_LENGTH {
            info.issues.push("Title too long (>60 chars)".to_string());
            recommendations.push("Shorten title to <=60 characters.");
        }

        (Some(title), info)
    }

    pub fn check_meta_description(
        document: &Html,
        recommendations: &mut Recommendations,
    ) -> (Option<String>, MetaDescriptionInfo) {
        let mut info = MetaDescriptionInfo::default();
        let content = document
            .select(&META_DESC_SELECTOR)
            .next()
            .and_then(|el| el.value().attr("content"))
            .filter(|c| !c.is_empty());

        let Some(content) = content else {
            info.issues.push("Missing meta description".to_string());
            recommendations.push("Add a unique meta description (120-160 characters).");
            return (None, info);
        };

        let content = content.trim().to_string();
        info.length = content.chars().count();
        if info.length < META_DESCRIPTION_MIN_LENGTH {
            info.issues
                .push("Description too short (<50 chars)".to_string());
            recommendations.push("Expand meta description to 120-160 characters.");
        }
        if info.length > META_DESCRIPTION_MAX_LENGTH {
            info.issues
                .push("Description too long (>160 chars)".to_string());
            recommendations.push("Shorten meta description to <=160 characters.");
        }

        (Some(content), info)
    }

    pub fn check_h1(document: &Html, recommendations: &mut Recommendations) -> (Vec<String>, H1Info) {
        let h1_tags: Vec<String> = document
            .select(&H1_SELECTOR)
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|text| !text.is_empty())
            .collect();

        let mut info = H1Info {
            count: h1_tags.len(),
            issues: vec![],
        };
        if h1_tags.is_empty() {
            info.issues.push("No H1".to_string());
            recommendations.push("Add one descriptive H1 heading.");
        } else if h1_tags.len() > 1 {
            info.issues.push("Multiple H1s".to_string());
            recommendations.push("Use only one primary H1 heading per page.");
        }

        (h1_tags, info)
    }

    pub fn check_images(
        document: &Html,
        recommendations: &mut Recommendations,
    ) -> (Vec<String>, ImagesInfo) {
        let mut total = 0;
        let mut missing = Vec::new();

        for img in document.select(&IMG_SELECTOR) {
            total += 1;
            let has_alt = img
                .value()
                .attr("alt")
                .is_some_and(|alt| !alt.trim().is_empty());
            if !has_alt {
                missing.push(img.value().attr("src").unwrap_or("unknown").to_string());
            }
        }

        if !missing.is_empty() {
            recommendations.push(format!("{} images missing alt text.", missing.len()));
        }

        (missing, ImagesInfo { total })
    }

    pub fn check_canonical(
        document: &Html,
        page_url: &Url,
        recommendations: &mut Recommendations,
    ) -> (Option<String>, CanonicalInfo) {
        let mut info = CanonicalInfo::default();
        let href = document
            .select(&LINK_REL_SELECTOR)
            .find(|el| has_rel(el, "canonical"))
            .and_then(|el| el.value().attr("href"))
            .filter(|href| !href.trim().is_empty());

        let Some(href) = href else {
            info.issues.push("Missing canonical".to_string());
            recommendations.push("Add a canonical <link> to avoid duplicate content.");
            return (None, info);
        };

        match page_url.join(href.trim()) {
            Ok(canonical) => {
                if host_key(&canonical).map(|(host, _)| host)
                    != host_key(page_url).map(|(host, _)| host)
                {
                    info.issues
                        .push("Canonical points to different domain".to_string());
                    recommendations.push("Ensure canonical URL points to the same domain.");
                }
                (Some(canonical.to_string()), info)
            }
            Err(e) => {
                tracing::debug!(href = %href, error = %e, "Unparsable canonical URL");
                info.issues.push("Canonical URL is invalid".to_string());
                recommendations.push("Fix the canonical <link> so it holds a valid URL.");
                (Some(href.to_string()), info)
            }
        }
    }

    pub fn check_viewport(document: &Html, recommendations: &mut Recommendations) -> bool {
        let present = document.select(&VIEWPORT_SELECTOR).next().is_some();
        if !present {
            recommendations.push("Add responsive viewport meta tag.");
        }
        present
    }

    pub fn check_meta_robots(document: &Html, recommendations: &mut Recommendations) -> MetaRobots {
        let mut robots = MetaRobots::default();
        let Some(content) = document
            .select(&ROBOTS_META_SELECTOR)
            .next()
            .and_then(|el| el.value().attr("content"))
            .filter(|c| !c.is_empty())
        else {
            return robots;
        };

        let lowered = content.to_lowercase();
        let tokens: Vec<&str> = lowered
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
            .collect();
        robots.noindex = tokens.contains(&"noindex");
        robots.nofollow = tokens.contains(&"nofollow");
        robots.content = Some(content.to_string());

        if robots.noindex {
            recommendations.push("Page is set to noindex.");
        }
        if robots.nofollow {
            recommendations.push("Page is set to nofollow.");
        }

        robots
    }

    pub fn check_lang_and_charset(
        document: &Html,
        recommendations: &mut Recommendations,
    ) -> LangCharset {
        let lang = document
            .select(&HTML_SELECTOR)
            .next()
            .and_then(|el| el.value().attr("lang"))
            .map(str::trim)
            .filter(|lang| !lang.is_empty())
            .map(str::to_string);
        if lang.is_none() {
            recommendations.push("Set <html lang> attribute for accessibility and SEO.");
        }

        let charset = document
            .select(&META_CHARSET_SELECTOR)
            .filter_map(|el| el.value().attr("charset"))
            .map(|c| c.trim().to_lowercase())
            .find(|c| !c.is_empty())
            .or_else(|| {
                document
                    .select(&META_HTTP_EQUIV_SELECTOR)
                    .filter(|el| {
                        el.value()
                            .attr("http-equiv")
                            .is_some_and(|v| v.trim().eq_ignore_ascii_case("content-type"))
                    })
                    .filter_map(|el| el.value().attr("content"))
                    .find(|c| !c.trim().is_empty())
                    .map(charset_from_content_type)
            });
        if charset.is_none() {
            recommendations.push("Declare a charset (e.g., UTF-8).");
        }

        LangCharset { lang, charset }
    }

    pub fn check_hreflang(
        document: &Html,
        page_url: &Url,
        recommendations: &mut Recommendations,
    ) -> Vec<Hreflang> {
        let hreflangs: Vec<Hreflang> = document
            .select(&LINK_REL_SELECTOR)
            .filter(|el| has_rel(el, "alternate"))
            .filter_map(|el| {
                let hreflang = el.value().attr("hreflang").filter(|v| !v.is_empty())?;
                let href = el.value().attr("href").filter(|v| !v.is_empty())?;
                let href = page_url
                    .join(href)
                    .map(|u| u.to_string())
                    .unwrap_or_else(|_| href.to_string());
                Some(Hreflang {
                    hreflang: hreflang.to_string(),
                    href,
                })
            })
            .collect();

        if !hreflangs.is_empty()
            && !hreflangs
                .iter()
                .any(|h| h.hreflang.eq_ignore_ascii_case("x-default"))
        {
            recommendations.push("Add x-default hreflang for international pages.");
        }

        hreflangs
    }

    /// Open Graph, Twitter Card and JSON-LD checks
    pub fn analyze_social(document: &Html, recommendations: &mut Recommendations) -> SocialStructured {
        let mut social = SocialStructured::default();

        if document.select(&OG_SELECTOR).next().is_some() {
            social.open_graph = true;
        } else {
            recommendations.push("Add Open Graph tags for better social sharing.");
        }

        if document.select(&TWITTER_CARD_SELECTOR).next().is_some() {
            social.twitter_card = true;
        } else {
            recommendations.push("Add Twitter Card meta tags.");
        }

        let json_ld_blocks = document.select(&SCRIPT_SELECTOR).filter(|el| {
            el.value()
                .attr("type")
                .is_some_and(|t| t.trim().eq_ignore_ascii_case("application/ld+json"))
        });
        for script in json_ld_blocks {
            let text = script.text().collect::<String>();
            match serde_json::from_str::<serde_json::Value>(&text) {
                Ok(_) => social.json_ld_blocks += 1,
                Err(e) => {
                    tracing::debug!(error = %e, "Invalid JSON-LD block");
                    social.json_ld_errors += 1;
                    recommendations.push("Fix invalid JSON-LD structured data.");
                }
            }
        }

        social
    }
}

fn has_rel(element: &ElementRef, wanted: &str) -> bool {
    element
        .value()
        .attr("rel")
        .is_some_and(|rel| rel.split_whitespace().any(|r| r.eq_ignore_ascii_case(wanted)))
}

/// Pulls `charset=...` out of a Content-Type value, else returns the whole value
fn charset_from_content_type(content: &str) -> String {
    let lowered = content.trim().to_lowercase();
    lowered
        .split(';')
        .filter_map(|part| part.trim().strip_prefix("charset="))
        .map(|c| c.trim_matches(|ch| ch == '"' || ch == '\'').to_string())
        .find(|c| !c.is_empty())
        .unwrap_or(lowered)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_charset_from_content_type() {
        assert_eq!(
            charset_from_content_type("text/html; charset=ISO-8859-1"),
            "iso-8859-1"
        );
        assert_eq!(charset_from_content_type("text/html;charset=\"utf-8\""), "utf-8");
        assert_eq!(charset_from_content_type("text/html"), "text/html");
    }
}
