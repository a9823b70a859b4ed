//! Server-rendered HTML pages.
//!
//! Every value that originates from a request header goes through
//! [`escape`] before it is placed in markup.

use std::fmt::Write;

use crate::classifier::{AccessDecision, CallerInfo, Denial};

const STYLE: &str = r#"
    body { margin: 0; font-family: system-ui, sans-serif; color: #222; }
    .container { min-height: 100vh; display: flex; flex-direction: column; align-items: center; justify-content: center; padding: 2rem 0.5rem; }
    .allowed { background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); }
    .denied { background: linear-gradient(135deg, #ff6b6b 0%, #ee5a24 100%); color: white; text-align: center; }
    main { max-width: 1000px; width: 100%; }
    h1 { color: white; text-align: center; }
    .grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(280px, 1fr)); gap: 1rem; }
    .card { background: white; border-radius: 10px; padding: 1.25rem; }
    .card h2 { margin-top: 0; font-size: 1.1rem; }
    .info-item { margin: 0.4rem 0; word-break: break-all; }
    .raw-data { background: #1e1e1e; color: #d4d4d4; border-radius: 10px; padding: 1rem; margin-top: 1.5rem; overflow-x: auto; }
    .badge { color: white; text-align: center; margin-bottom: 1.5rem; }
    a.redirect { color: #ffd700; font-weight: bold; }
"#;

/// Escape text for use in HTML element content and quoted attributes.
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn document(title: &str, class: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title}</title>\n<style>{STYLE}</style>\n</head>\n\
         <body>\n<div class=\"container {class}\">\n<main>\n{body}</main>\n</div>\n</body>\n</html>\n",
        title = escape(title),
    )
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}

fn card(out: &mut String, heading: &str, items: &[(&str, &str)]) {
    let _ = writeln!(out, "<div class=\"card\">\n<h2>{}</h2>", heading);
    for (label, value) in items {
        let _ = writeln!(
            out,
            "<div class=\"info-item\"><strong>{}:</strong> {}</div>",
            label,
            escape(value)
        );
    }
    out.push_str("</div>\n");
}

pub fn render_decision(decision: &AccessDecision) -> String {
    match decision {
        AccessDecision::Allow(info) => render_dashboard(info),
        AccessDecision::Deny(denial) => render_denied(denial),
    }
}

pub fn render_dashboard(info: &CallerInfo) -> String {
    let mut body = String::new();
    body.push_str("<h1>Welcome to CloudFront Caller Info</h1>\n");
    if info.waf_protected {
        body.push_str("<div class=\"badge\">Protected by CloudFront + WAF</div>\n");
    }
    body.push_str("<div class=\"grid\">\n");

    card(
        &mut body,
        "Location Information",
        &[
            ("Country", info.country.as_str()),
            ("City", info.city.as_str()),
            ("Region", info.region.as_str()),
            ("Timezone", info.timezone.as_str()),
        ],
    );

    let flags = &info.device_flags;
    card(
        &mut body,
        "Device Information",
        &[
            ("Device Type", info.device_type.as_str()),
            ("Is Mobile", yes_no(flags.is_mobile)),
            ("Is Desktop", yes_no(flags.is_desktop)),
            ("Is Tablet", yes_no(flags.is_tablet)),
            ("Is Smart TV", yes_no(flags.is_smart_tv)),
        ],
    );

    card(
        &mut body,
        "Connection Information",
        &[
            ("IP Address", info.ip_address.as_str()),
            ("User Agent", info.user_agent.as_str()),
            ("Accept Language", info.accept_language.as_str()),
            ("CloudFront Edge", info.cloudfront_edge.as_str()),
        ],
    );

    card(
        &mut body,
        "Time Information",
        &[("Server Time", info.server_time.as_str()), ("Request ID", info.request_id.as_str())],
    );

    let access_method = info.access_method.to_string();
    let score = info.security_score.to_string();
    card(
        &mut body,
        "Security Information",
        &[
            ("Access Method", access_method.as_str()),
            (
                "CloudFront Headers",
                if info.has_cloudfront_headers { "Present" } else { "Missing" },
            ),
            ("WAF Protection", if info.waf_protected { "Active" } else { "Inactive" }),
            ("Security Score", score.as_str()),
        ],
    );
    body.push_str("</div>\n");

    let raw = serde_json::to_string_pretty(&info.raw_headers).unwrap_or_else(|_| "{}".to_string());
    let _ = writeln!(
        body,
        "<div class=\"raw-data\">\n<h3>Raw Headers (for debugging)</h3>\n<pre>{}</pre>\n</div>",
        escape(&raw)
    );

    document("CloudFront Caller Information", "allowed", &body)
}

pub fn render_denied(denial: &Denial) -> String {
    let url = escape(&denial.redirect_url);
    let mut body = String::new();
    body.push_str("<h1>Access Denied</h1>\n");
    let _ = writeln!(body, "<p>{}</p>", escape(&denial.message));
    let _ = writeln!(
        body,
        "<div class=\"card\" style=\"color:#222\">\n\
         <p><strong>Error:</strong> ACCESS_DENIED</p>\n\
         <p><strong>Security Score:</strong> {}</p>\n\
         <p><strong>Time:</strong> {}</p>\n\
         <p><strong>Redirect URL:</strong> <a href=\"{url}\">{url}</a></p>\n\
         </div>",
        denial.security_score,
        escape(&denial.timestamp),
    );
    let _ = writeln!(
        body,
        "<p><a class=\"redirect\" href=\"{url}\">Access via CloudFront</a></p>"
    );
    document("Access Denied - CloudFront Caller Information", "denied", &body)
}

/// Server-side rendering smoke test page.
pub fn render_ssr_test(time: &str) -> String {
    let body = format!(
        "<p>This is rendered server-side at request time</p>\n<p>{}</p>\n",
        escape(time)
    );
    document("SSR Test", "", &body)
}
