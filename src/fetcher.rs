use flate2::read::{DeflateDecoder, GzDecoder, ZlibDecoder};
use reqwest::Client;
use reqwest::header::{self, HeaderMap};
use std::io::Read;
use std::time::{Duration, Instant};
use thiserror::Error;

/// A completed page fetch. HTTP error statuses are data, not errors.
#[derive(Debug, Clone)]
pub struct FetchResult {
    /// URL after redirects were followed
    pub final_url: String,
    pub status: u16,
    pub headers: HeaderMap,
    /// Decoded body text
    pub body: String,
    /// Number of bytes received before content decoding
    pub wire_length: usize,
    pub elapsed: Duration,
}

/// Transport-level failure: DNS, connect, TLS, timeout or a broken body stream
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct FetchError {
    pub message: String,
    pub elapsed: Duration,
}

/// Performs one GET with redirects followed, timing it regardless of outcome
pub async fn fetch_page(client: &Client, url: &str) -> Result<FetchResult, FetchError> {
    let start = Instant::now();

    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => {
            return Err(FetchError {
                message: describe(&e),
                elapsed: start.elapsed(),
            });
        }
    };

    let status = response.status().as_u16();
    let final_url = response.url().to_string();
    let headers = response.headers().clone();

    if let Some(content_type) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
    {
        let ct_lower = content_type.to_lowercase();
        if !ct_lower.contains("text/html") && !ct_lower.contains("application/xhtml") {
            tracing::warn!(
                url = %url,
                content_type = %content_type,
                "Non-HTML content type detected, parsing may fail"
            );
        }
    }

    let bytes = match response.bytes().await {
        Ok(bytes) => bytes,
        Err(e) => {
            return Err(FetchError {
                message: describe(&e),
                elapsed: start.elapsed(),
            });
        }
    };
    let elapsed = start.elapsed();

    let encoding = headers
        .get(header::CONTENT_ENCODING)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_lowercase())
        .unwrap_or_default();
    let body = decode_body(&bytes, &encoding).unwrap_or_else(|e| {
        tracing::warn!(url = %url, encoding = %encoding, error = %e, "Failed to decode body, using raw bytes");
        String::from_utf8_lossy(&bytes).into_owned()
    });

    Ok(FetchResult {
        final_url,
        status,
        headers,
        body,
        wire_length: bytes.len(),
        elapsed,
    })
}

/// Decodes a response body according to its `Content-Encoding`
pub fn decode_body(bytes: &[u8], encoding: &str) -> std::io::Result<String> {
    let mut decoded = Vec::new();
    match encoding {
        "gzip" | "x-gzip" => {
            GzDecoder::new(bytes).read_to_end(&mut decoded)?;
        }
        "deflate" => {
            // Servers disagree on whether "deflate" is zlib-wrapped.
            if ZlibDecoder::new(bytes).read_to_end(&mut decoded).is_err() {
                decoded.clear();
                DeflateDecoder::new(bytes).read_to_end(&mut decoded)?;
            }
        }
        _ => decoded.extend_from_slice(bytes),
    }
    Ok(String::from_utf8_lossy(&decoded).into_owned())
}

fn describe(error: &reqwest::Error) -> String {
    let mut message = if error.is_timeout() {
        format!("request timed out: {}", error)
    } else {
        error.to_string()
    };
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
