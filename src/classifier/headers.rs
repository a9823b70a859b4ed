//! Edge header names and lookup helpers.
//!
//! CloudFront forwards viewer metadata as plain request headers. All names
//! here are lower-case, which is how `http::HeaderMap` stores them.

use axum::http::HeaderMap;

pub const VIEWER_COUNTRY: &str = "cloudfront-viewer-country";
pub const VIEWER_CITY: &str = "cloudfront-viewer-city";
pub const VIEWER_REGION: &str = "cloudfront-viewer-country-region";
pub const VIEWER_TIME_ZONE: &str = "cloudfront-viewer-time-zone";
pub const VIEWER_ADDRESS: &str = "cloudfront-viewer-address";

pub const IS_MOBILE_VIEWER: &str = "cloudfront-is-mobile-viewer";
pub const IS_DESKTOP_VIEWER: &str = "cloudfront-is-desktop-viewer";
pub const IS_TABLET_VIEWER: &str = "cloudfront-is-tablet-viewer";
pub const IS_SMARTTV_VIEWER: &str = "cloudfront-is-smarttv-viewer";

pub const FORWARDED_FOR: &str = "x-forwarded-for";
pub const EDGE_POP: &str = "x-amz-cf-pop";
pub const EDGE_REQUEST_ID: &str = "x-amz-cf-id";
pub const VIA: &str = "via";
pub const USER_AGENT: &str = "user-agent";
pub const ACCEPT_LANGUAGE: &str = "accept-language";

/// Shared secret the distribution attaches as a custom origin header.
pub const EDGE_SECRET: &str = "x-cloudfront-secret";

/// User agent CloudFront uses when it fetches from the origin itself.
pub const EDGE_USER_AGENT: &str = "Amazon CloudFront";

/// Marker looked for inside the `via` header.
pub const VIA_EDGE_MARKER: &str = "cloudfront";

/// Display fallback for anything the edge did not send.
pub const UNKNOWN: &str = "Unknown";

/// Headers copied verbatim into the raw snapshot, in display order.
pub const SNAPSHOT_HEADERS: [&str; 15] = [
    VIEWER_COUNTRY,
    VIEWER_CITY,
    VIEWER_REGION,
    VIEWER_TIME_ZONE,
    IS_MOBILE_VIEWER,
    IS_DESKTOP_VIEWER,
    IS_TABLET_VIEWER,
    IS_SMARTTV_VIEWER,
    VIEWER_ADDRESS,
    FORWARDED_FOR,
    EDGE_POP,
    EDGE_REQUEST_ID,
    USER_AGENT,
    ACCEPT_LANGUAGE,
    VIA,
];

/// Returns the first value of `name` if it is valid UTF-8 and non-empty.
///
/// `HeaderValue::to_str` rejects anything outside visible ASCII, which would
/// drop city names and user agents with accented characters.
pub fn value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| std::str::from_utf8(v.as_bytes()).ok())
        .filter(|v| !v.is_empty())
}

/// True when `name` carries a usable value.
pub fn is_present(headers: &HeaderMap, name: &str) -> bool {
    value(headers, name).is_some()
}

/// Header lookup with the `"Unknown"` display fallback.
pub fn value_or_unknown(headers: &HeaderMap, name: &str) -> String {
    value(headers, name).unwrap_or(UNKNOWN).to_string()
}

/// CloudFront encodes boolean viewer flags as the literal string `"true"`.
pub fn flag(headers: &HeaderMap, name: &str) -> bool {
    value(headers, name) == Some("true")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_empty_value_is_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(VIEWER_CITY, HeaderValue::from_static(""));
        assert!(!is_present(&headers, VIEWER_CITY));
        assert_eq!(value_or_unknown(&headers, VIEWER_CITY), UNKNOWN);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let mut headers = HeaderMap::new();
        let name = axum::http::HeaderName::from_bytes(b"CloudFront-Viewer-Country").unwrap();
        headers.insert(name, HeaderValue::from_static("DE"));
        assert_eq!(value(&headers, VIEWER_COUNTRY), Some("DE"));
    }

    #[test]
    fn test_non_ascii_utf8_is_present() {
        let mut headers = HeaderMap::new();
        headers.insert(VIEWER_CITY, HeaderValue::from_bytes("São Paulo".as_bytes()).unwrap());
        headers.insert(USER_AGENT, HeaderValue::from_bytes("Müller-Browser/1.0".as_bytes()).unwrap());
        assert_eq!(value(&headers, VIEWER_CITY), Some("São Paulo"));
        assert_eq!(value_or_unknown(&headers, USER_AGENT), "Müller-Browser/1.0");
    }

    #[test]
    fn test_invalid_utf8_is_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(VIEWER_CITY, HeaderValue::from_bytes(&[0xC3, 0x28]).unwrap());
        assert!(!is_present(&headers, VIEWER_CITY));
    }

    #[test]
    fn test_flag_requires_literal_true() {
        let mut headers = HeaderMap::new();
        headers.insert(IS_MOBILE_VIEWER, HeaderValue::from_static("TRUE"));
        headers.insert(IS_TABLET_VIEWER, HeaderValue::from_static("true"));
        assert!(!flag(&headers, IS_MOBILE_VIEWER));
        assert!(flag(&headers, IS_TABLET_VIEWER));
        assert!(!flag(&headers, IS_DESKTOP_VIEWER));
    }
}
