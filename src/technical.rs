use crate::fetcher::FetchResult;
use crate::models::{Recommendations, TechnicalSignals};
use reqwest::header::{self, HeaderMap};
use std::time::Duration;

pub const SLOW_RESPONSE_MS: u64 = 1500;
pub const LARGE_PAGE_BYTES: u64 = 2 * 1024 * 1024;

const COMPRESSION_ENCODINGS: [&str; 3] = ["gzip", "br", "deflate"];

/// Derives header-based signals from a completed page fetch
pub fn extract(
    fetched: &FetchResult,
    is_https: bool,
    recommendations: &mut Recommendations,
) -> TechnicalSignals {
    let content_length = header_value(&fetched.headers, header::CONTENT_LENGTH)
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(fetched.wire_length as u64);

    analyze_headers(
        fetched.status,
        &fetched.headers,
        fetched.elapsed,
        content_length,
        is_https,
        recommendations,
    )
}

pub fn analyze_headers(
    status_code: u16,
    headers: &HeaderMap,
    elapsed: Duration,
    content_length: u64,
    is_https: bool,
    recommendations: &mut Recommendations,
) -> TechnicalSignals {
    let gzip = header_value(headers, header::CONTENT_ENCODING).is_some_and(|encoding| {
        encoding
            .split(',')
            .any(|e| COMPRESSION_ENCODINGS.contains(&e.trim().to_lowercase().as_str()))
    });

    let signals = TechnicalSignals {
        status_code,
        response_time_ms: elapsed.as_millis() as u64,
        content_length,
        gzip,
        hsts: headers.contains_key(header::STRICT_TRANSPORT_SECURITY),
        x_content_type_options: header_value(headers, header::X_CONTENT_TYPE_OPTIONS)
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("nosniff")),
        x_frame_options: headers.contains_key(header::X_FRAME_OPTIONS),
        referrer_policy: headers.contains_key(header::REFERRER_POLICY),
        csp: headers.contains_key(header::CONTENT_SECURITY_POLICY),
        server: header_value(headers, header::SERVER),
        cache_control: header_value(headers, header::CACHE_CONTROL),
    };

    if signals.response_time_ms > SLOW_RESPONSE_MS {
        recommendations.push("Page load (first byte) seems slow (>1.5s). Optimize performance.");
    }
    if signals.content_length > LARGE_PAGE_BYTES {
        recommendations.push("Large page size (>2MB). Consider optimizing assets.");
    }
    if is_https && !signals.hsts {
        recommendations.push("Enable HSTS for better transport security.");
    }
    if !signals.x_content_type_options {
        recommendations.push("Add X-Content-Type-Options: nosniff header.");
    }
    if !signals.x_frame_options {
        recommendations.push("Add X-Frame-Options header to prevent clickjacking.");
    }
    if !signals.referrer_policy {
        recommendations.push("Set a Referrer-Policy header.");
    }
    if !signals.csp {
        recommendations.push("Consider adding a Content-Security-Policy header.");
    }

    signals
}

fn header_value(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}
