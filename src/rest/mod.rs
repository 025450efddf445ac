// rest/mod.rs — the scanner's public HTTP surface.
//
// Axum server exposing the scan behind a single endpoint.
//
// Endpoints:
//   GET /health    — run a scan pass; `output` selects the rendering
//                    (flag / json / html), `full` selects exhaustive
//                    enumeration
//   GET /version   — build version, for deploy checks

pub mod routes;

use anyhow::Result;
use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

use crate::AppContext;

pub async fn start_server(ctx: Arc<AppContext>) -> Result<()> {
    let bind = format!("{}:{}", ctx.config.bind_address, ctx.config.port);
    let addr: SocketAddr = bind.parse()?;

    let router = build_router(ctx);

    info!("health endpoint listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}

pub fn build_router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/health", get(routes::health::health))
        .route("/version", get(routes::health::version))
        .with_state(ctx)
}
