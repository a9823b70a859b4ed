//! Route handlers.

use axum::{
    extract::State,
    http::HeaderMap,
    response::{Html, IntoResponse},
    Json,
};
use chrono::Utc;
use serde::Serialize;
use std::time::Instant;

use crate::classifier::{self, iso_timestamp, AccessDecision};
use crate::http::request::{request_id, PeerAddr};
use crate::http::response::{DecisionJson, DecisionPage};
use crate::http::pages;
use crate::http::server::AppState;
use crate::observability::metrics;

fn decide(state: &AppState, headers: &HeaderMap, peer: PeerAddr) -> AccessDecision {
    let policy = state.policy.load();
    let decision = classifier::classify(headers, peer.0, &policy);
    metrics::record_decision(&decision);

    tracing::debug!(
        request_id = %request_id(headers),
        allowed = decision.is_allowed(),
        security_score = decision.security_score().value(),
        "Request classified"
    );
    decision
}

/// GET / -- dashboard or deny page.
pub async fn dashboard(
    State(state): State<AppState>,
    peer: PeerAddr,
    headers: HeaderMap,
) -> impl IntoResponse {
    let start = Instant::now();
    let page = DecisionPage(decide(&state, &headers, peer));
    metrics::record_request("dashboard", page.status().as_u16(), start);
    page
}

/// GET /api/caller -- the same decision as JSON.
pub async fn caller_json(
    State(state): State<AppState>,
    peer: PeerAddr,
    headers: HeaderMap,
) -> impl IntoResponse {
    let start = Instant::now();
    let body = DecisionJson(decide(&state, &headers, peer));
    metrics::record_request("api_caller", body.status().as_u16(), start);
    body
}

/// GET /test -- server-side rendering smoke test.
pub async fn ssr_test() -> Html<String> {
    let start = Instant::now();
    tracing::info!("Rendering server-side test page");
    let page = pages::render_ssr_test(&iso_timestamp(Utc::now()));
    metrics::record_request("ssr_test", 200, start);
    Html(page)
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
}

/// GET /healthz
pub async fn healthz() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
