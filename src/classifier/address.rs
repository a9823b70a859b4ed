//! Client address resolution.

use axum::http::HeaderMap;
use std::net::IpAddr;

use super::headers;

/// Resolve the viewer's address for display.
///
/// Order: first hop of `x-forwarded-for`, then the host part of
/// `cloudfront-viewer-address`, then the transport peer, then `"Unknown"`.
/// Nothing is validated; the value is shown, never trusted.
pub fn resolve_client_ip(headers: &HeaderMap, peer: Option<IpAddr>) -> String {
    if let Some(first) = headers::value(headers, headers::FORWARDED_FOR)
        .and_then(|chain| chain.split(',').next())
        .map(str::trim)
        .filter(|hop| !hop.is_empty())
    {
        return first.to_string();
    }

    if let Some(host) = headers::value(headers, headers::VIEWER_ADDRESS)
        .map(viewer_address_host)
        .filter(|host| !host.is_empty())
    {
        return host.to_string();
    }

    match peer {
        Some(ip) => ip.to_string(),
        None => headers::UNKNOWN.to_string(),
    }
}

/// `cloudfront-viewer-address` is `ip:port`. IPv6 hosts contain colons
/// themselves, so the trailing segment is only a port when it is numeric and
/// cutting it leaves a valid address (or the whole value is no address).
fn viewer_address_host(value: &str) -> &str {
    if let Some(rest) = value.strip_prefix('[') {
        return match rest.split_once(']') {
            Some((host, _)) => host,
            None => rest,
        };
    }

    if let Some((host, port)) = value.rsplit_once(':') {
        let is_port = !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit());
        if is_port && (host.parse::<IpAddr>().is_ok() || value.parse::<IpAddr>().is_err()) {
            return host;
        }
    }

    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (k, v) in pairs {
            map.insert(*k, HeaderValue::from_static(v));
        }
        map
    }

    #[test]
    fn test_forwarded_for_first_hop() {
        let h = headers(&[(headers::FORWARDED_FOR, "1.2.3.4, 5.6.6.6")]);
        assert_eq!(resolve_client_ip(&h, None), "1.2.3.4");
    }

    #[test]
    fn test_forwarded_for_wins_over_viewer_address() {
        let h = headers(&[
            (headers::FORWARDED_FOR, "1.2.3.4"),
            (headers::VIEWER_ADDRESS, "9.9.9.9:443"),
        ]);
        assert_eq!(resolve_client_ip(&h, None), "1.2.3.4");
    }

    #[test]
    fn test_viewer_address_strips_port() {
        let h = headers(&[(headers::VIEWER_ADDRESS, "9.9.9.9:443")]);
        assert_eq!(resolve_client_ip(&h, None), "9.9.9.9");
    }

    #[test]
    fn test_viewer_address_ipv6() {
        let h = headers(&[(headers::VIEWER_ADDRESS, "2001:db8::1:46532")]);
        assert_eq!(resolve_client_ip(&h, None), "2001:db8::1");
    }

    #[test]
    fn test_viewer_address_ipv6_without_port() {
        let h = headers(&[(headers::VIEWER_ADDRESS, "2001:db8::1")]);
        assert_eq!(resolve_client_ip(&h, None), "2001:db8::1");
    }

    #[test]
    fn test_viewer_address_bracketed_ipv6() {
        let h = headers(&[(headers::VIEWER_ADDRESS, "[2001:db8::1]:443")]);
        assert_eq!(resolve_client_ip(&h, None), "2001:db8::1");
        let h = headers(&[(headers::VIEWER_ADDRESS, "[2001:db8::1]")]);
        assert_eq!(resolve_client_ip(&h, None), "2001:db8::1");
    }

    #[test]
    fn test_viewer_address_non_numeric_suffix_kept() {
        let h = headers(&[(headers::VIEWER_ADDRESS, "edge-host:http")]);
        assert_eq!(resolve_client_ip(&h, None), "edge-host:http");
    }

    #[test]
    fn test_empty_first_hop_falls_through() {
        let h = headers(&[
            (headers::FORWARDED_FOR, " , 5.6.6.6"),
            (headers::VIEWER_ADDRESS, "9.9.9.9"),
        ]);
        assert_eq!(resolve_client_ip(&h, None), "9.9.9.9");
    }

    #[test]
    fn test_peer_then_unknown() {
        let h = HeaderMap::new();
        let peer: IpAddr = "10.0.0.7".parse().unwrap();
        assert_eq!(resolve_client_ip(&h, Some(peer)), "10.0.0.7");
        assert_eq!(resolve_client_ip(&h, None), "Unknown");
    }
}
