// SPDX-License-Identifier: MIT
//! Probe executor — one HTTP GET per enumerated URL, timed and classified.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::scan::enumerate::ProbeTarget;

/// Query parameter carrying the site credential on every probe URL.
const AUTH_QUERY_PARAM: &str = "APP_PASSWORD";

/// Marker that the page rendered to completion. A body that never closes
/// usually means the site died mid-render behind a 200.
pub const BODY_CLOSE_MARKER: &str = "</body>";

/// Status code recorded when no HTTP response was received at all.
pub const TRANSPORT_FAILURE_CODE: u16 = 0;

/// Outcome of a single probe. Write-once; the aggregator only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeResult {
    pub label: String,
    /// Site-relative path that was probed.
    pub url: String,
    /// HTTP status code; [`TRANSPORT_FAILURE_CODE`] when the request never
    /// completed.
    pub code: u16,
    /// Wall-clock request time, rounded to the nearest millisecond.
    pub response_time: u64,
    /// The response body was empty.
    pub empty: bool,
    /// The response body contains [`BODY_CLOSE_MARKER`].
    pub body: bool,
    /// `code == 200 && !empty && body`.
    pub valid: bool,
}

impl ProbeResult {
    /// Classify a completed HTTP exchange.
    pub fn classify(
        label: impl Into<String>,
        url: impl Into<String>,
        code: u16,
        body_text: &str,
        response_time: u64,
    ) -> Self {
        let empty = body_text.is_empty();
        let body = body_text.contains(BODY_CLOSE_MARKER);
        Self {
            label: label.into(),
            url: url.into(),
            code,
            response_time,
            empty,
            body,
            valid: code == 200 && !empty && body,
        }
    }

    /// Record a request that never produced an HTTP response
    /// (timeout, refused connection, broken body stream).
    pub fn transport_failure(
        label: impl Into<String>,
        url: impl Into<String>,
        response_time: u64,
    ) -> Self {
        Self {
            label: label.into(),
            url: url.into(),
            code: TRANSPORT_FAILURE_CODE,
            response_time,
            empty: true,
            body: false,
            valid: false,
        }
    }
}

/// Performs probes against the configured site.
///
/// The client carries the per-request timeout, so a hanging page bounds
/// itself — the executor never waits longer than the client allows.
#[derive(Clone)]
pub struct Prober {
    client: reqwest::Client,
    base_url: String,
    auth_token: Option<String>,
}

impl Prober {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        auth_token: Option<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            auth_token,
        }
    }

    /// Fetch one target and classify the result.
    ///
    /// Transport failures are folded into the returned [`ProbeResult`];
    /// this never errors, so one dead URL cannot abort a scan pass.
    pub async fn probe(&self, target: &ProbeTarget) -> ProbeResult {
        let url = self.probe_url(&target.url);
        let started = Instant::now();
        let outcome = self.fetch(&url).await;
        let response_time = round_ms(started.elapsed());

        match outcome {
            Ok((code, body_text)) => {
                let result = ProbeResult::classify(
                    &target.label,
                    &target.url,
                    code,
                    &body_text,
                    response_time,
                );
                if result.valid {
                    debug!(
                        label = %result.label,
                        url = %result.url,
                        code = result.code,
                        response_time_ms = result.response_time,
                        "probe ok"
                    );
                } else {
                    warn!(
                        label = %result.label,
                        url = %result.url,
                        code = result.code,
                        empty = result.empty,
                        body_close = result.body,
                        "probe invalid"
                    );
                }
                result
            }
            Err(e) => {
                warn!(
                    label = %target.label,
                    url = %target.url,
                    error = %e,
                    "probe transport failure"
                );
                ProbeResult::transport_failure(&target.label, &target.url, response_time)
            }
        }
    }

    async fn fetch(&self, url: &str) -> Result<(u16, String), reqwest::Error> {
        let response = self.client.get(url).send().await?;
        let code = response.status().as_u16();
        let body_text = response.text().await?;
        Ok((code, body_text))
    }

    /// Absolute probe URL: base + path, plus the auth parameter when a
    /// token is configured.
    fn probe_url(&self, path: &str) -> String {
        let mut url = format!("{}{}", self.base_url, path);
        if let Some(token) = &self.auth_token {
            url.push(if path.contains('?') { '&' } else { '?' });
            url.push_str(AUTH_QUERY_PARAM);
            url.push('=');
            url.push_str(token);
        }
        url
    }
}

fn round_ms(elapsed: Duration) -> u64 {
    (elapsed.as_secs_f64() * 1000.0).round() as u64
}

// ─── Tests ────────────────────────────────────────────────────────────────────
