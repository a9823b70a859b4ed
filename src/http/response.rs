//! Response handling.
//!
//! # Responsibilities
//! - Map classifier decisions to HTTP responses
//! - Response headers shared by every route
//!
//! # Design Decisions
//! - The HTML deny page is a normal 200 page with a redirect link
//! - The JSON API reports a denial as 403 so scripts can branch on status
//! - Nothing here is cacheable: every page is per-request

use axum::{
    http::{header, HeaderName, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};

use crate::classifier::AccessDecision;
use crate::http::pages;

/// Response headers added to every route when not already set.
pub fn default_headers() -> [(HeaderName, HeaderValue); 3] {
    [
        (header::CACHE_CONTROL, HeaderValue::from_static("no-store")),
        (header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff")),
        (header::REFERRER_POLICY, HeaderValue::from_static("no-referrer")),
    ]
}

/// A decision rendered as the dashboard or deny page.
pub struct DecisionPage(pub AccessDecision);

impl DecisionPage {
    pub fn status(&self) -> StatusCode {
        StatusCode::OK
    }
}

impl IntoResponse for DecisionPage {
    fn into_response(self) -> Response {
        (self.status(), Html(pages::render_decision(&self.0))).into_response()
    }
}

/// A decision serialized as JSON.
pub struct DecisionJson(pub AccessDecision);

impl DecisionJson {
    pub fn status(&self) -> StatusCode {
        if self.0.is_allowed() {
            StatusCode::OK
        } else {
            StatusCode::FORBIDDEN
        }
    }
}

impl IntoResponse for DecisionJson {
    fn into_response(self) -> Response {
        (self.status(), Json(self.0)).into_response()
    }
}
