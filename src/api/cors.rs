//! CORS policy for browser callers.
//!
//! Policy:
//! - Development origins (local-dev allow-list, or any loopback host) are
//!   echoed back verbatim, so credentialed requests from dev tooling work.
//! - Everything else gets the wildcard, which implies no credentialed
//!   cross-origin access.
//!
//! The preflight middleware wraps the whole Router, so `OPTIONS` never
//! reaches routing, authentication, or the provider, and every outbound
//! response (error paths included) carries the CORS headers.

use axum::{
    extract::Request,
    http::{header::HeaderName, HeaderMap, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Exact scheme+host+port combinations used by local development tooling.
const DEV_ORIGINS: &[&str] = &[
    "http://localhost:3000",
    "http://localhost:5173",
    "http://localhost:8080",
    "http://127.0.0.1:3000",
    "http://127.0.0.1:5173",
];

const ALLOW_HEADERS: &str = "authorization, x-client-info, apikey, content-type";
const ALLOW_METHODS: &str = "GET, POST, PUT, PATCH, DELETE, OPTIONS";

/// Preflight responses may be cached for a day to cut preflight traffic.
const MAX_AGE_SECONDS: &str = "86400";

/// Classify an origin as development: an exact allow-list match, or any
/// origin pointing at a loopback host.
pub fn is_development_origin(origin: &str) -> bool {
    DEV_ORIGINS.contains(&origin) || origin.contains("localhost") || origin.contains("127.0.0.1")
}

/// Compute the CORS headers for a request origin.
///
/// Pure function of the origin and the static allow-list; called for every
/// response, not just preflight.
pub fn cors_headers(origin: Option<&str>) -> HeaderMap {
    let allow_origin = match origin {
        Some(o) if is_development_origin(o) => o,
        _ => "*",
    };

    let mut headers = HeaderMap::new();
    insert_static(&mut headers, "access-control-allow-origin", allow_origin);
    insert_static(&mut headers, "access-control-allow-headers", ALLOW_HEADERS);
    insert_static(&mut headers, "access-control-allow-methods", ALLOW_METHODS);
    insert_static(&mut headers, "access-control-max-age", MAX_AGE_SECONDS);
    headers
}

fn insert_static(headers: &mut HeaderMap, name: &'static str, value: &str) {
    if let Ok(value) = HeaderValue::from_str(value) {
        headers.insert(HeaderName::from_static(name), value);
    }
}

/// Extract the raw `Origin` header value, if any.
pub fn request_origin(headers: &HeaderMap) -> Option<&str> {
    headers.get("origin").and_then(|v| v.to_str().ok())
}

/// Router-level middleware: short-circuit `OPTIONS` preflight with 204 and
/// stamp CORS headers onto every other response.
pub async fn apply_cors(request: Request, next: Next) -> Response {
    let origin = request_origin(request.headers()).map(str::to_owned);
    let cors = cors_headers(origin.as_deref());

    if request.method() == Method::OPTIONS {
        let mut response = StatusCode::NO_CONTENT.into_response();
        response.headers_mut().extend(cors);
        return response;
    }

    let mut response = next.run(request).await;
    // Overwrites any headers a handler already set with identical values, so
    // the guarantee holds even when a response skipped the envelope builder.
    response.headers_mut().extend(cors);
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allow_origin(headers: &HeaderMap) -> &str {
        headers
            .get("access-control-allow-origin")
            .unwrap()
            .to_str()
            .unwrap()
    }

    #[test]
    fn test_dev_origin_is_echoed_back() {
        for origin in [
            "http://localhost:3000",
            "http://localhost:5173",
            "http://127.0.0.1:3000",
            "http://localhost:9999",
            "https://127.0.0.1",
        ] {
            let headers = cors_headers(Some(origin));
            assert_eq!(allow_origin(&headers), origin, "origin {origin}");
        }
    }

    #[test]
    fn test_production_and_absent_origins_get_wildcard() {
        assert_eq!(allow_origin(&cors_headers(Some("https://app.example.com"))), "*");
        assert_eq!(allow_origin(&cors_headers(Some(""))), "*");
        assert_eq!(allow_origin(&cors_headers(None)), "*");
    }

    #[test]
    fn test_fixed_headers_always_present() {
        let headers = cors_headers(None);
        assert_eq!(
            headers.get("access-control-allow-headers").unwrap(),
            "authorization, x-client-info, apikey, content-type"
        );
        assert_eq!(
            headers.get("access-control-allow-methods").unwrap(),
            "GET, POST, PUT, PATCH, DELETE, OPTIONS"
        );
        assert_eq!(headers.get("access-control-max-age").unwrap(), "86400");
    }
}
