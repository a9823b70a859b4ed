//! Request-side helpers.
//!
//! # Responsibilities
//! - Request ID header name and lookup
//! - Per-request tracing span carrying the request ID
//! - Transport peer extraction for the address fallback
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing (outermost layer)
//! - The peer is optional so the router also works without connect info

use axum::{
    body::Body,
    extract::{ConnectInfo, FromRequestParts},
    http::{request::Parts, HeaderMap, Request},
};
use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};
use tracing::Span;

pub const X_REQUEST_ID: &str = "x-request-id";

/// The request ID set by the request-id layer, or `"unknown"`.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Span used by the trace layer for every request.
pub fn make_request_span(request: &Request<Body>) -> Span {
    tracing::info_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id(request.headers()),
    )
}

/// Transport-level peer IP, when the server was started with connect info.
#[derive(Debug, Clone, Copy)]
pub struct PeerAddr(pub Option<IpAddr>);

impl<S> FromRequestParts<S> for PeerAddr
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());
        Ok(PeerAddr(peer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_id_fallback() {
        let mut headers = HeaderMap::new();
        assert_eq!(request_id(&headers), "unknown");
        headers.insert(X_REQUEST_ID, "abc-123".parse().unwrap());
        assert_eq!(request_id(&headers), "abc-123");
    }

    #[tokio::test]
    async fn test_peer_addr_from_connect_info() {
        let addr: SocketAddr = "203.0.113.9:5555".parse().unwrap();
        let request = Request::builder()
            .extension(ConnectInfo(addr))
            .body(())
            .unwrap();
        let (mut parts, _) = request.into_parts();
        let PeerAddr(peer) = PeerAddr::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(peer, Some(addr.ip()));
    }

    #[tokio::test]
    async fn test_peer_addr_absent() {
        let (mut parts, _) = Request::builder().body(()).unwrap().into_parts();
        let PeerAddr(peer) = PeerAddr::from_request_parts(&mut parts, &()).await.unwrap();
        assert!(peer.is_none());
    }
}
