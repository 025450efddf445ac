// SPDX-License-Identifier: MIT
//! Report renderer — turns a [`HealthReport`] into one of three payloads.
//!
//! The HTTP status always encodes the verdict (200 healthy, 406 unhealthy)
//! so pollers can ignore the body entirely; the body goes from a 1-byte
//! flag to a full HTML table depending on the requested mode.

use std::fmt::Write as _;

use crate::scan::reporter::HealthReport;

/// Status returned for an unhealthy verdict. Non-2xx so that dumb HTTP
/// monitors flag it without parsing the body.
pub const UNHEALTHY_STATUS: u16 = 406;

/// Requested rendering of a scan pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Single-character health flag: `1` healthy, `0` unhealthy.
    None,
    Json,
    Html,
}

impl OutputMode {
    /// Map the `output` request parameter: absent/empty → flag, `json` →
    /// JSON, anything else → HTML.
    pub fn from_param(value: Option<&str>) -> Self {
        match value {
            None | Some("") => OutputMode::None,
            Some("json") => OutputMode::Json,
            Some(_) => OutputMode::Html,
        }
    }
}

/// A rendered report, ready for the transport layer to write out.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub body: String,
    pub content_type: &'static str,
    pub status: u16,
}

/// Render `report` in the requested mode. `base_url` is only used to make
/// the URLs in the HTML table clickable.
pub fn render(report: &HealthReport, mode: OutputMode, base_url: &str) -> Rendered {
    let status = if report.has_error {
        UNHEALTHY_STATUS
    } else {
        200
    };

    match mode {
        OutputMode::None => Rendered {
            body: if report.has_error { "0" } else { "1" }.to_string(),
            content_type: "text/plain; charset=utf-8",
            status,
        },
        OutputMode::Json => Rendered {
            body: serde_json::to_string(report).unwrap_or_default(),
            content_type: "application/json",
            status,
        },
        OutputMode::Html => Rendered {
            body: html_document(report, base_url),
            content_type: "text/html; charset=utf-8",
            status,
        },
    }
}

fn html_document(report: &HealthReport, base_url: &str) -> String {
    let mut html = String::with_capacity(2048 + report.results.len() * 256);
    html.push_str("<!DOCTYPE html><html><head>");
    html.push_str(r#"<meta charset="utf-8">"#);
    html.push_str(r#"<meta name="viewport" content="width=device-width, initial-scale=1">"#);
    html.push_str("<title>Site Health</title>");
    html.push_str(concat!(
        "<style>",
        "body{padding:20px;font-family:sans-serif}",
        "table{width:100%;border-collapse:collapse}",
        "th,td{padding:6px 10px;border-bottom:1px solid #ddd;text-align:left}",
        "tr:nth-child(even){background:#f6f6f6}",
        "td.center,th.center{text-align:center}",
        "</style>"
    ));
    html.push_str("</head><body><table>");
    html.push_str(concat!(
        "<thead><tr><th>Label</th><th>Url</th>",
        r#"<th class="center">Code</th><th class="center">Empty</th>"#,
        r#"<th class="center">Body</th><th class="center">Timing</th></tr></thead>"#,
    ));
    html.push_str("<tbody>");

    for result in &report.results {
        let code_style = if result.code != 200 {
            r#" style="color:red""#
        } else {
            ""
        };
        let _ = write!(
            html,
            concat!(
                "<tr><td>{label}</td>",
                r#"<td><a href="{href}" target="_blank">{url}</a></td>"#,
                r#"<td class="center"{code_style}>{code}</td>"#,
                r#"<td class="center">{empty}</td>"#,
                r#"<td class="center">{body}</td>"#,
                r#"<td class="center">{timing}ms</td></tr>"#,
            ),
            label = escape(&result.label),
            href = escape(&format!("{base_url}{}", result.url)),
            url = escape(&result.url),
            code_style = code_style,
            code = result.code,
            empty = yes_no(result.empty),
            body = yes_no(result.body),
            timing = result.response_time,
        );
    }

    html.push_str("</tbody></table></body></html>");
    html
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

/// Minimal HTML escaping for text and attribute positions.
fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

// ─── Tests ────────────────────────────────────────────────────────────────────
