// rest/routes/health.rs — GET /health and GET /version.

use axum::{
    extract::{Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::error;

use crate::scan::OutputMode;
use crate::AppContext;

/// A scan verdict reflects live state — shared caches must never serve a
/// stale one.
const CACHE_CONTROL_VALUE: &str = "s-maxage=0";

#[derive(Debug, Deserialize)]
pub struct HealthParams {
    /// Rendering: absent/empty → 1-byte flag, "json" → JSON, else HTML.
    #[serde(default)]
    output: Option<String>,
    /// Truthy → probe every item and term instead of one per group.
    #[serde(default)]
    full: Option<String>,
}

pub async fn health(
    State(ctx): State<Arc<AppContext>>,
    Query(params): Query<HealthParams>,
) -> Response {
    let output = OutputMode::from_param(params.output.as_deref());
    let exhaustive = is_truthy(params.full.as_deref());

    let rendered = ctx
        .scanner
        .run_and_render(
            ctx.repository.as_ref(),
            &ctx.config.page_state_names(),
            exhaustive,
            output,
            &ctx.config.site_url,
        )
        .await;

    match rendered {
        Ok(rendered) => {
            let status =
                StatusCode::from_u16(rendered.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (
                status,
                [
                    (header::CONTENT_TYPE, HeaderValue::from_static(rendered.content_type)),
                    (header::CACHE_CONTROL, HeaderValue::from_static(CACHE_CONTROL_VALUE)),
                ],
                rendered.body,
            )
                .into_response()
        }
        Err(e) => {
            // The inventory being unreachable means the scan could not run
            // at all — not an unhealthy-site verdict.
            error!(error = %e, "scan aborted — inventory unavailable");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CACHE_CONTROL, HeaderValue::from_static(CACHE_CONTROL_VALUE))],
                format!("scan failed: {e}\n"),
            )
                .into_response()
        }
    }
}

pub async fn version() -> Json<Value> {
    Json(json!({
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Request-parameter truthiness: present and not an explicit "off" value.
fn is_truthy(value: Option<&str>) -> bool {
    match value {
        None => false,
        Some(v) => !matches!(
            v.to_ascii_lowercase().as_str(),
            "" | "0" | "false" | "no" | "off"
        ),
    }
}
