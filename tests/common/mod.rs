//! Shared utilities for integration tests.

use axum::body::Body;
use axum::http::Request;
use edge_caller_info::config::AppConfig;
use edge_caller_info::{ClassifierPolicy, HttpServer, Shutdown};
use http_body_util::BodyExt;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

pub const SECRET: &str = "integration-test-secret";

pub fn gated_policy() -> ClassifierPolicy {
    ClassifierPolicy {
        enforce_access_control: true,
        secret: Some(SECRET.to_string()),
        redirect_url: "https://d111111abcdef8.cloudfront.net".to_string(),
        min_security_score: 70,
    }
}

#[allow(dead_code)]
pub fn open_policy() -> ClassifierPolicy {
    ClassifierPolicy {
        enforce_access_control: false,
        secret: None,
        ..gated_policy()
    }
}

/// Headers CloudFront would attach to a desktop request from Berlin.
pub fn edge_headers() -> Vec<(&'static str, &'static str)> {
    vec![
        ("x-cloudfront-secret", SECRET),
        ("cloudfront-viewer-country", "DE"),
        ("cloudfront-viewer-city", "Berlin"),
        ("cloudfront-viewer-country-region", "BE"),
        ("cloudfront-viewer-time-zone", "Europe/Berlin"),
        ("cloudfront-is-desktop-viewer", "true"),
        ("cloudfront-is-mobile-viewer", "false"),
        ("cloudfront-viewer-address", "9.9.9.9:443"),
        ("x-forwarded-for", "1.2.3.4, 5.6.6.6"),
        ("x-amz-cf-pop", "FRA56-P1"),
        ("x-amz-cf-id", "edge-request-id=="),
        ("user-agent", "Amazon CloudFront"),
        ("accept-language", "de-DE,de;q=0.9"),
    ]
}

pub fn get(uri: &str, headers: &[(&str, &str)]) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn body_string(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// A server running on an ephemeral port.
#[allow(dead_code)]
pub struct LiveServer {
    pub addr: SocketAddr,
    pub config_tx: mpsc::UnboundedSender<AppConfig>,
    pub shutdown: Shutdown,
}

#[allow(dead_code)]
pub async fn start_server(policy: ClassifierPolicy) -> LiveServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let (config_tx, config_updates) = mpsc::unbounded_channel();
    let server = HttpServer::new(AppConfig::default(), policy);
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, config_updates, server_shutdown).await;
    });

    LiveServer {
        addr,
        config_tx,
        shutdown,
    }
}
