// SPDX-License-Identifier: MIT
//! Content inventory seam.
//!
//! The scanner never talks to the CMS's internals directly — everything it
//! needs to know about the site (which content types exist, which items and
//! taxonomy terms are published, which pages are assigned to named states)
//! comes through the [`ContentRepository`] trait. [`rest::RestRepository`]
//! is the production implementation over the CMS REST inventory; tests
//! inject in-memory fixtures.
//!
//! All URLs crossing this seam are site-relative paths with a leading `/`.

pub mod rest;

use async_trait::async_trait;

pub use rest::RestRepository;

/// A category of content items, with the visibility flags that decide
/// whether its pages are publicly reachable.
#[derive(Debug, Clone)]
pub struct ContentType {
    pub name: String,
    pub public: bool,
    pub publicly_queryable: bool,
    /// `true` when the type has an archive listing page.
    pub has_archive: bool,
}

/// One published content item, reduced to its permalink.
#[derive(Debug, Clone)]
pub struct ContentItem {
    /// Site-relative permalink, e.g. `/hello-world/`.
    pub path: String,
}

/// A named classification system whose terms resolve to browsable pages.
#[derive(Debug, Clone)]
pub struct Taxonomy {
    pub name: String,
    pub public: bool,
    pub publicly_queryable: bool,
}

/// One taxonomy term, reduced to its term-page link.
#[derive(Debug, Clone)]
pub struct Term {
    /// Site-relative term page path, e.g. `/genre/jazz/`.
    pub path: String,
}

/// Failure talking to the site inventory.
///
/// Distinct from a probe failure: the inventory being unreachable means the
/// scan could not run, not that the site is unhealthy.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("inventory request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("inventory returned HTTP {status} for {url}")]
    Status { status: u16, url: String },
    #[error("content type '{0}' is not in the inventory")]
    UnknownType(String),
    #[error("taxonomy '{0}' is not in the inventory")]
    UnknownTaxonomy(String),
}

/// Read-only view of the scanned site's content inventory.
///
/// `limit` is the sampling knob: `Some(n)` fetches at most `n` entries
/// (the scanner passes 1 in sample mode), `None` fetches everything.
#[async_trait]
pub trait ContentRepository: Send + Sync {
    async fn content_types(&self) -> Result<Vec<ContentType>, RepositoryError>;

    async fn items(
        &self,
        type_name: &str,
        limit: Option<usize>,
    ) -> Result<Vec<ContentItem>, RepositoryError>;

    /// Archive listing path for a type, when one exists.
    async fn archive_path(&self, type_name: &str) -> Result<Option<String>, RepositoryError>;

    async fn taxonomies(&self) -> Result<Vec<Taxonomy>, RepositoryError>;

    async fn terms(
        &self,
        taxonomy: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Term>, RepositoryError>;

    /// Resolve the page assigned to a named state (e.g. "maintenance").
    /// `Ok(None)` means no page is assigned — the caller skips, it is not
    /// an error.
    async fn named_page_path(&self, state: &str) -> Result<Option<String>, RepositoryError>;
}
