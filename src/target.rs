use url::Url;

/// The page under audit.
///
/// Normalization never fails: input that does not parse as a URL is kept
/// verbatim so the fetch can report the real error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditTarget {
    /// The raw input as given by the caller
    pub raw: String,
    /// Input with a scheme guaranteed
    pub url: String,
    /// `scheme://host[:port]` with a lower-cased host, empty when unparsable
    pub origin: String,
    parsed: Option<Url>,
}

impl AuditTarget {
    pub fn new(raw: &str) -> Self {
        let url = ensure_scheme(raw.trim());
        let parsed = Url::parse(&url).ok();
        let origin = parsed.as_ref().map(origin_of).unwrap_or_default();

        Self {
            raw: raw.to_string(),
            url,
            origin,
            parsed,
        }
    }

    pub fn parsed(&self) -> Option<&Url> {
        self.parsed.as_ref()
    }

    pub fn is_https(&self) -> bool {
        self.parsed
            .as_ref()
            .is_some_and(|url| url.scheme() == "https")
    }

    /// URL of a well-known file at the site root, e.g. `/robots.txt`
    pub fn well_known(&self, path: &str) -> Option<String> {
        let mut url = self.parsed.clone()?;
        url.set_path(path);
        url.set_query(None);
        url.set_fragment(None);
        Some(url.to_string())
    }
}

/// Prefixes `https://` when the input carries no scheme
pub fn ensure_scheme(input: &str) -> String {
    if has_scheme(input) {
        input.to_string()
    } else {
        format!("https://{}", input)
    }
}

fn has_scheme(input: &str) -> bool {
    // A scheme is `alpha *( alpha / digit / "+" / "-" / "." )` followed by
    // "://"; a bare `host:port` must not count as one.
    match input.split_once("://") {
        Some((scheme, _)) => {
            let mut chars = scheme.chars();
            chars.next().is_some_and(|c| c.is_ascii_alphabetic())
                && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}

fn origin_of(url: &Url) -> String {
    let host = url.host_str().unwrap_or("").to_lowercase();
    match url.port() {
        Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
        None => format!("{}://{}", url.scheme(), host),
    }
}

/// Key used for internal/external classification: lower-cased host plus
/// the explicit port. The scheme is ignored, so `http://a.com` and
/// `https://a.com` agree, while `a.com:8080` is a different site.
pub fn host_key(url: &Url) -> Option<(String, Option<u16>)> {
    url.host_str()
        .map(|host| (host.to_lowercase(), url.port()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adds_https_when_scheme_missing() {
        let target = AuditTarget::new("example.com/path");
        assert_eq!(target.url, "https://example.com/path");
        assert_eq!(target.origin, "https://example.com");
        assert!(target.is_https());
    }

    #[test]
    fn test_keeps_existing_scheme() {
        let target = AuditTarget::new("http://Example.COM:8080/a?b=c");
        assert_eq!(target.url, "http://Example.COM:8080/a?b=c");
        assert_eq!(target.origin, "http://example.com:8080");
        assert!(!target.is_https());
    }

    #[test]
    fn test_host_and_port_without_scheme() {
        let target = AuditTarget::new("localhost:3000");
        assert_eq!(target.url, "https://localhost:3000");
    }

    #[test]
    fn test_trims_whitespace_but_keeps_raw() {
        let target = AuditTarget::new("  example.com  ");
        assert_eq!(target.raw, "  example.com  ");
        assert_eq!(target.url, "https://example.com");
    }

    #[test]
    fn test_malformed_input_passes_through() {
        let target = AuditTarget::new("http://exa mple.com");
        assert_eq!(target.url, "http://exa mple.com");
        assert!(target.parsed().is_none());
        assert_eq!(target.origin, "");
        assert_eq!(target.well_known("/robots.txt"), None);
    }

    #[test]
    fn test_well_known_paths() {
        let target = AuditTarget::new("https://example.com/blog/post?id=1#top");
        assert_eq!(
            target.well_known("/robots.txt").as_deref(),
            Some("https://example.com/robots.txt")
        );
        assert_eq!(
            target.well_known("/sitemap.xml").as_deref(),
            Some("https://example.com/sitemap.xml")
        );
    }

    #[test]
    fn test_host_key_ignores_scheme() {
        let a = Url::parse("https://Example.com/").unwrap();
        let b = Url::parse("https://example.com:443/x").unwrap();
        let c = Url::parse("http://example.com/").unwrap();
        let d = Url::parse("https://example.com:8443/").unwrap();
        // Default ports are dropped while parsing
        assert_eq!(host_key(&a), host_key(&b));
        assert_eq!(host_key(&a), host_key(&c));
        assert_ne!(host_key(&a), host_key(&d));
    }
}
