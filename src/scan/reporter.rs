// SPDX-License-Identifier: MIT
//! Health aggregator — drives the enumerator and the prober, folds the
//! per-URL results into one verdict.
//!
//! The verdict is an OR-fold: the site is healthy iff every probe came
//! back valid. Zero probes is healthy — an empty site has nothing broken.

use futures_util::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::content::{ContentRepository, RepositoryError};
use crate::scan::enumerate::enumerate;
use crate::scan::probe::{ProbeResult, Prober};
use crate::scan::render::{self, OutputMode, Rendered};

/// Aggregated outcome of one scan pass. Immutable once the pass completes.
///
/// Serializes to the report wire shape: `{ "has_error": …, "status": […] }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    pub has_error: bool,
    #[serde(rename = "status")]
    pub results: Vec<ProbeResult>,
}

impl HealthReport {
    /// Fold the overall verdict: unhealthy iff any probe is invalid.
    pub fn from_results(results: Vec<ProbeResult>) -> Self {
        let has_error = results.iter().any(|r| !r.valid);
        Self { has_error, results }
    }
}

/// Runs scan passes: enumerate, probe every target, aggregate.
#[derive(Clone)]
pub struct Scanner {
    prober: Prober,
    concurrency: usize,
}

impl Scanner {
    /// `concurrency` is the probe fan-out width; 1 means strictly
    /// sequential probing.
    pub fn new(prober: Prober, concurrency: usize) -> Self {
        Self {
            prober,
            concurrency: concurrency.max(1),
        }
    }

    /// One full pass over the enumerated target list.
    ///
    /// Probes fan out `concurrency` at a time, but results are collected
    /// in enumeration order, so reports are deterministic regardless of
    /// completion order. A failing probe never aborts the pass — only an
    /// unreachable inventory does.
    pub async fn run(
        &self,
        repo: &dyn ContentRepository,
        page_states: &[String],
        exhaustive: bool,
    ) -> Result<HealthReport, RepositoryError> {
        let targets = enumerate(repo, page_states, exhaustive).await?;
        info!(targets = targets.len(), exhaustive, "scan pass started");

        let prober = &self.prober;
        let targets_ref = &targets;
        let results: Vec<ProbeResult> = stream::iter(0..targets.len())
            .map(|i| async move { prober.probe(&targets_ref[i]).await })
            .buffered(self.concurrency)
            .collect()
            .await;

        let report = HealthReport::from_results(results);
        if report.has_error {
            let invalid = report.results.iter().filter(|r| !r.valid).count();
            warn!(
                probes = report.results.len(),
                invalid, "scan pass found unhealthy URLs"
            );
        } else {
            info!(probes = report.results.len(), "scan pass healthy");
        }
        Ok(report)
    }

    /// Single entry point for the transport layer: run a pass and render
    /// it in the requested mode.
    pub async fn run_and_render(
        &self,
        repo: &dyn ContentRepository,
        page_states: &[String],
        exhaustive: bool,
        output: OutputMode,
        base_url: &str,
    ) -> Result<Rendered, RepositoryError> {
        let report = self.run(repo, page_states, exhaustive).await?;
        Ok(render::render(&report, output, base_url))
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
