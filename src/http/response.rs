//! Response construction.
//!
//! # Responsibilities
//! - Permissive CORS header on every response
//! - JSON content type on success, plain text on errors
//! - Freshness headers on cacheable responses
//! - Rebuild stored responses on cache hits

use axum::body::Body;
use axum::http::{header, HeaderName, HeaderValue, StatusCode};
use axum::response::Response;

use crate::caching::{CachedResponse, Freshness};

/// Value of the `Allow` header on 405 responses.
pub const ALLOW_HEADER_VALUE: &str = "GET, HEAD, OPTIONS";

/// Human-readable TTL and fetch time of a cacheable response.
pub const X_GATEWAY_CACHE: HeaderName = HeaderName::from_static("x-gateway-cache");

/// Whether a response came from the cache.
pub const X_CACHE: HeaderName = HeaderName::from_static("x-cache");

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const TEXT_CONTENT_TYPE: &str = "text/plain";

/// How the cache took part in a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl CacheStatus {
    fn as_header(&self) -> HeaderValue {
        match self {
            CacheStatus::Hit => HeaderValue::from_static("HIT"),
            CacheStatus::Miss => HeaderValue::from_static("MISS"),
        }
    }
}

/// A plain-text response carrying the CORS header.
pub fn plain_text(status: StatusCode, message: impl Into<String>) -> Response {
    let mut response = Response::new(Body::from(message.into()));
    *response.status_mut() = status;

    let headers = response.headers_mut();
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(TEXT_CONTENT_TYPE));
    response
}

/// The stored form of a successful JSON response.
pub fn json_success(body: String, freshness: Option<&Freshness>) -> CachedResponse {
    let mut headers = vec![
        (header::ACCESS_CONTROL_ALLOW_ORIGIN.to_string(), "*".to_string()),
        (header::CONTENT_TYPE.to_string(), JSON_CONTENT_TYPE.to_string()),
    ];

    if let Some(freshness) = freshness {
        headers.push((header::CACHE_CONTROL.to_string(), freshness.cache_control()));
        headers.push((X_GATEWAY_CACHE.to_string(), freshness.describe()));
    }

    CachedResponse {
        status: StatusCode::OK.as_u16(),
        headers,
        body,
    }
}

/// Turn a stored response into an HTTP response.
///
/// Headers that no longer parse are skipped. The CORS header is always set.
pub fn render(cached: CachedResponse, cache_status: Option<CacheStatus>) -> Response {
    let status = StatusCode::from_u16(cached.status).unwrap_or(StatusCode::OK);

    let mut response = Response::new(Body::from(cached.body));
    *response.status_mut() = status;

    let headers = response.headers_mut();
    for (name, value) in &cached.headers {
        match (
            HeaderName::try_from(name.as_str()),
            HeaderValue::try_from(value.as_str()),
        ) {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => tracing::warn!(header = %name, "Skipping unparseable stored header"),
        }
    }
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));

    if let Some(cache_status) = cache_status {
        headers.insert(X_CACHE, cache_status.as_header());
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caching::CacheDecision;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_plain_text_headers() {
        let response = plain_text(StatusCode::FORBIDDEN, "Endpoint not in allowlist");
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain");
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    #[test]
    fn test_json_without_freshness() {
        let response = render(json_success("{}".into(), None), None);
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
        assert!(response.headers().get(header::CACHE_CONTROL).is_none());
        assert!(response.headers().get(X_GATEWAY_CACHE).is_none());
        assert!(response.headers().get(X_CACHE).is_none());
    }

    #[test]
    fn test_json_with_freshness() {
        let fetched_at = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let freshness = Freshness::new(CacheDecision::Cacheable { days: 1 }, fetched_at).unwrap();

        let response = render(json_success("[]".into(), Some(&freshness)), Some(CacheStatus::Miss));
        assert_eq!(response.headers()[header::CACHE_CONTROL], "public, max-age=86400");
        assert_eq!(
            response.headers()[X_GATEWAY_CACHE],
            "ttl=1d (86400s); fetched=2023-11-14T22:13:20Z"
        );
        assert_eq!(response.headers()[X_CACHE], "MISS");
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    #[test]
    fn test_render_skips_bad_headers() {
        let cached = CachedResponse {
            status: 200,
            headers: vec![("bad header".into(), "x".into())],
            body: "{}".into(),
        };
        let response = render(cached, Some(CacheStatus::Hit));
        assert_eq!(response.headers().len(), 2);
        assert_eq!(response.headers()[X_CACHE], "HIT");
    }
}
