//! Client IP and user-agent extraction.
//!
//! The service runs behind a reverse proxy, so the client address comes
//! from `X-Forwarded-For` (first hop) or `X-Real-IP`. An empty result
//! disables IP rate limiting for the request rather than failing it.

use axum::http::HeaderMap;

/// Longest user-agent string stored on a session row.
const MAX_USER_AGENT_LEN: usize = 255;

/// Best-effort client IP, or an empty string when unknown.
pub fn client_ip(headers: &HeaderMap) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first) = forwarded.split(',').next() {
            let trimmed = first.trim();
            if !trimmed.is_empty() {
                return trimmed.to_string();
            }
        }
    }
    headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
        .unwrap_or_default()
}

/// User-agent header, truncated to the stored column width.
pub fn user_agent(headers: &HeaderMap) -> String {
    headers
        .get(axum::http::header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.chars().take(MAX_USER_AGENT_LEN).collect())
        .unwrap_or_default()
}
