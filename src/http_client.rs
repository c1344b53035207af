use anyhow::{Context, Result};
use reqwest::{Client, ClientBuilder, header, redirect};
use std::time::Duration;

/// Common HTTP headers used for all requests
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";
const ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";
const CONNECTION: &str = "keep-alive";
/// Encodings the page fetcher decodes on its own
const PAGE_ACCEPT_ENCODING: &str = "gzip, deflate";

/// Timeout for link validation probes and robots/sitemap fetches
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(3);
const MAX_REDIRECTS: usize = 10;

fn default_headers() -> header::HeaderMap {
    let mut headers = header::HeaderMap::new();
    headers.insert(header::ACCEPT, header::HeaderValue::from_static(ACCEPT));
    headers.insert(
        header::ACCEPT_LANGUAGE,
        header::HeaderValue::from_static(ACCEPT_LANGUAGE),
    );
    headers.insert(
        header::CONNECTION,
        header::HeaderValue::from_static(CONNECTION),
    );
    headers
}

fn base_builder(timeout: Duration, headers: header::HeaderMap) -> ClientBuilder {
    ClientBuilder::new()
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .timeout(timeout)
}

/// Creates a browser-like client that follows redirects and transparently
/// decompresses bodies. Used for robots.txt and sitemap.xml.
pub fn build_http_client(timeout: Duration) -> Result<Client> {
    let client = base_builder(timeout, default_headers())
        .redirect(redirect::Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .deflate(true)
        .build()
        .context("Failed to build HTTP client")?;

    Ok(client)
}

/// Client for the audited page itself.
///
/// Decompression is left to the fetcher so the `Content-Encoding` and
/// `Content-Length` response headers survive for the technical checks.
pub fn build_page_client(timeout: Duration) -> Result<Client> {
    let mut headers = default_headers();
    headers.insert(
        header::ACCEPT_ENCODING,
        header::HeaderValue::from_static(PAGE_ACCEPT_ENCODING),
    );

    let client = base_builder(timeout, headers)
        .redirect(redirect::Policy::limited(MAX_REDIRECTS))
        .gzip(false)
        .brotli(false)
        .deflate(false)
        .build()
        .context("Failed to build page HTTP client")?;

    Ok(client)
}

/// Client for link validation. Redirects are not followed so a 3xx answer
/// is reported as a redirect rather than as its target's status.
pub fn build_probe_client(timeout: Duration) -> Result<Client> {
    let client = base_builder(timeout, default_headers())
        .redirect(redirect::Policy::none())
        .gzip(true)
        .brotli(true)
        .deflate(true)
        .build()
        .context("Failed to build link probe client")?;

    Ok(client)
}
