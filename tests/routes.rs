//! Router-level tests driven with `oneshot`, no listener involved.

use axum::http::StatusCode;
use edge_caller_info::config::AppConfig;
use edge_caller_info::HttpServer;
use tower::ServiceExt;

mod common;

fn app(policy: edge_caller_info::ClassifierPolicy) -> axum::Router {
    HttpServer::new(AppConfig::default(), policy).router()
}

#[tokio::test]
async fn test_dashboard_renders_caller_info() {
    let headers = common::edge_headers();
    let resp = app(common::gated_policy())
        .oneshot(common::get("/", &headers))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("content-type").unwrap(),
        "text/html; charset=utf-8"
    );
    let html = common::body_string(resp).await;
    assert!(html.contains("Berlin"));
    assert!(html.contains("Europe/Berlin"));
    assert!(html.contains("Desktop"));
    assert!(html.contains("1.2.3.4"));
    assert!(html.contains("FRA56-P1"));
    assert!(html.contains("100/100"));
    assert!(html.contains("[PRESENT]"));
    assert!(!html.contains(common::SECRET));
}

#[tokio::test]
async fn test_dashboard_denies_direct_access_with_200_page() {
    let resp = app(common::gated_policy())
        .oneshot(common::get("/", &[("x-cloudfront-secret", "wrong")]))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let html = common::body_string(resp).await;
    assert!(html.contains("Access Denied"));
    assert!(html.contains("https://d111111abcdef8.cloudfront.net"));
    assert!(!html.contains("wrong"));
}

#[tokio::test]
async fn test_api_allow_json() {
    let headers = common::edge_headers();
    let resp = app(common::gated_policy())
        .oneshot(common::get("/api/caller", &headers))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&common::body_string(resp).await).unwrap();
    assert_eq!(json["decision"], "allow");
    assert_eq!(json["country"], "DE");
    assert_eq!(json["device_type"], "Desktop");
    assert_eq!(json["is_desktop"], true);
    assert_eq!(json["ip_address"], "1.2.3.4");
    assert_eq!(json["request_id"], "edge-request-id==");
    assert_eq!(json["security_score"], 100);
    assert_eq!(json["access_method"], "CloudFront");
    assert_eq!(json["raw_headers"]["x-cloudfront-secret"], "[PRESENT]");
}

#[tokio::test]
async fn test_api_deny_json_is_forbidden() {
    let mut headers = common::edge_headers();
    headers.retain(|(name, _)| *name != "x-cloudfront-secret");

    let resp = app(common::gated_policy())
        .oneshot(common::get("/api/caller", &headers))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let json: serde_json::Value = serde_json::from_str(&common::body_string(resp).await).unwrap();
    assert_eq!(json["decision"], "deny");
    assert_eq!(json["reason"], "SECRET_MISMATCH");
    // edge headers + user agent + forwarded-for
    assert_eq!(json["security_score"], 60);
    assert_eq!(json["redirect_url"], "https://d111111abcdef8.cloudfront.net");
}

#[tokio::test]
async fn test_open_policy_without_headers() {
    let resp = app(common::open_policy())
        .oneshot(common::get("/api/caller", &[]))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&common::body_string(resp).await).unwrap();
    assert_eq!(json["country"], "Unknown");
    // no connect info when driven through oneshot
    assert_eq!(json["ip_address"], "Unknown");
    assert_eq!(json["device_type"], "Unknown");
    assert_eq!(json["access_method"], "Direct");
    assert_eq!(json["waf_protected"], false);
    assert_eq!(json["raw_headers"]["x-cloudfront-secret"], "[MISSING]");
}

#[tokio::test]
async fn test_ssr_page() {
    let resp = app(common::gated_policy())
        .oneshot(common::get("/test", &[]))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let html = common::body_string(resp).await;
    assert!(html.contains("This is rendered server-side at request time"));
}

#[tokio::test]
async fn test_healthz() {
    let resp = app(common::gated_policy())
        .oneshot(common::get("/healthz", &[]))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&common::body_string(resp).await).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_request_id_and_default_headers() {
    let resp = app(common::gated_policy())
        .oneshot(common::get("/healthz", &[]))
        .await
        .unwrap();
    let id = resp.headers().get("x-request-id").unwrap().to_str().unwrap();
    assert_eq!(id.len(), 36);
    assert_eq!(resp.headers().get("cache-control").unwrap(), "no-store");
    assert_eq!(resp.headers().get("x-content-type-options").unwrap(), "nosniff");

    let resp = app(common::gated_policy())
        .oneshot(common::get("/healthz", &[("x-request-id", "client-chosen")]))
        .await
        .unwrap();
    assert_eq!(resp.headers().get("x-request-id").unwrap(), "client-chosen");
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let resp = app(common::gated_policy())
        .oneshot(common::get("/nope", &[]))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
