//! Authenticated session construction
//!
//! Credential acquisition happens outside this crate: the login tooling
//! exports a Netscape-format cookie file, and this module turns that file
//! into a ready-to-use `reqwest::Client`. The cookies are read-only here;
//! nothing in the crawl ever renegotiates authentication.

use crate::config::SessionConfig;
use crate::{Result, SweepError};
use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use reqwest::Client;
use std::path::Path;
use std::time::Duration;

/// One cookie from a Netscape-format export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
}

/// Reads cookies from a Netscape-format cookie file
///
/// Lines are tab-separated with seven fields; comments and malformed lines
/// are skipped (with a debug log), except `#HttpOnly_`-prefixed lines which
/// are valid cookies per the format. Expiry is ignored: the session is
/// assumed fresh, and a stale session surfaces as a zero-discovery error
/// downstream.
pub fn read_netscape_cookies(path: &Path) -> Result<Vec<Cookie>> {
    let content = std::fs::read_to_string(path).map_err(|e| SweepError::CookieFile {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    let mut cookies = Vec::new();
    for raw_line in content.lines() {
        let line = raw_line.trim();
        let line = line.strip_prefix("#HttpOnly_").unwrap_or(line);
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let parts: Vec<&str> = line.split('\t').collect();
        if parts.len() != 7 {
            tracing::debug!("Skipping malformed cookie line: {} fields", parts.len());
            continue;
        }
        cookies.push(Cookie {
            name: parts[5].to_string(),
            value: parts[6].to_string(),
        });
    }

    if cookies.is_empty() {
        tracing::warn!("Cookie file {} contained no cookies", path.display());
    }

    Ok(cookies)
}

/// Formats cookies as a single `Cookie` request header value
pub fn cookie_header(cookies: &[Cookie]) -> String {
    cookies
        .iter()
        .map(|c| format!("{}={}", c.name, c.value))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Builds the HTTP client used for the whole crawl
///
/// One client per crawl: connection reuse matters for the hundreds of
/// sequential round trips the discovery phase can issue.
pub fn build_http_client(config: &SessionConfig, cookies: &[Cookie]) -> Result<Client> {
    let mut headers = HeaderMap::new();
    if !cookies.is_empty() {
        let value =
            HeaderValue::from_str(&cookie_header(cookies)).map_err(|e| SweepError::CookieFile {
                path: config.cookies_path.clone(),
                message: format!("cookie value not header-safe: {}", e),
            })?;
        headers.insert(COOKIE, value);
    }

    let client = Client::builder()
        .default_headers(headers)
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()?;

    Ok(client)
}

/// Reads the configured cookie file and builds an authenticated client
pub fn build_session(config: &SessionConfig) -> Result<Client> {
    let cookies = read_netscape_cookies(Path::new(&config.cookies_path))?;
    tracing::info!(
        "Loaded {} cookies from {}",
        cookies.len(),
        config.cookies_path
    );
    build_http_client(config, &cookies)
}
