pub mod config;
pub mod content;
pub mod rest;
pub mod scan;

use std::sync::Arc;

use config::ScannerConfig;
use content::ContentRepository;
use scan::Scanner;

/// Shared application state passed to every route handler.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ScannerConfig>,
    /// Inventory of the scanned site — content types, items, taxonomies,
    /// terms, and named singleton pages.
    pub repository: Arc<dyn ContentRepository>,
    /// Probe orchestrator; owns the HTTP client used for page fetches.
    pub scanner: Scanner,
}

impl AppContext {
    pub fn new(
        config: Arc<ScannerConfig>,
        repository: Arc<dyn ContentRepository>,
        scanner: Scanner,
    ) -> Self {
        Self {
            config,
            repository,
            scanner,
        }
    }
}
