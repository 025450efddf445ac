//! Production [`ContentRepository`] over the CMS REST inventory.
//!
//! Reads the site's public REST index (`/wp-json/wp/v2/…`) to discover
//! content types, taxonomies, published items, and named pages. Serde
//! models keep only the fields the scanner consumes.
//!
//! Two mappings are deliberate approximations of the CMS's richer internal
//! registry:
//! - A type's `viewable` flag stands in for both `public` and
//!   `publicly_queryable` — the REST index does not expose them separately.
//! - Taxonomies listed in the index without a `visibility` object are
//!   treated as public and queryable; unregistered ones never appear at all.

use std::collections::{BTreeMap, HashMap};

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::debug;

use super::{
    ContentItem, ContentRepository, ContentType, RepositoryError, Taxonomy, Term,
};
use async_trait::async_trait;

/// REST collection page size; the API caps `per_page` at 100.
const PAGE_SIZE: usize = 100;

// ─── Inventory wire types ─────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct TypeRecord {
    slug: String,
    #[serde(default)]
    viewable: bool,
    /// `false`, `true`, or a custom archive slug string.
    #[serde(default)]
    has_archive: serde_json::Value,
    #[serde(default)]
    rest_base: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TaxonomyRecord {
    slug: String,
    #[serde(default)]
    visibility: Option<TaxonomyVisibility>,
    #[serde(default)]
    rest_base: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TaxonomyVisibility {
    #[serde(default)]
    public: bool,
    #[serde(default)]
    publicly_queryable: bool,
}

#[derive(Debug, Deserialize)]
struct LinkRecord {
    link: String,
}

// ─── Cached registry entries ──────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct TypeEntry {
    rest_base: String,
    archive: Option<String>,
}

// ─── RestRepository ───────────────────────────────────────────────────────────

pub struct RestRepository {
    site_url: String,
    client: reqwest::Client,
    /// State name → page ID, from `[page_states]` in config.
    page_states: BTreeMap<String, u64>,
    /// Type slug → collection endpoint + archive path. Refreshed by every
    /// `content_types()` call, so each scan sees a fresh registry.
    types: RwLock<Option<HashMap<String, TypeEntry>>>,
    /// Taxonomy slug → collection endpoint. Same refresh policy.
    taxonomies: RwLock<Option<HashMap<String, String>>>,
}

impl RestRepository {
    pub fn new(
        site_url: impl Into<String>,
        client: reqwest::Client,
        page_states: BTreeMap<String, u64>,
    ) -> Self {
        Self {
            site_url: site_url.into(),
            client,
            page_states,
            types: RwLock::new(None),
            taxonomies: RwLock::new(None),
        }
    }

    fn api_url(&self, tail: &str) -> String {
        format!("{}/wp-json/wp/v2/{}", self.site_url, tail)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, RepositoryError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RepositoryError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response.json::<T>().await?)
    }

    /// Fetch a collection endpoint, following pagination when `limit` is
    /// `None`, and relativize every returned link.
    async fn fetch_links(
        &self,
        collection_url: &str,
        limit: Option<usize>,
    ) -> Result<Vec<String>, RepositoryError> {
        let per_page = limit.map_or(PAGE_SIZE, |n| n.clamp(1, PAGE_SIZE));
        let mut paths = Vec::new();
        let mut page = 1usize;

        loop {
            let url = format!("{collection_url}?per_page={per_page}&page={page}&_fields=link");
            let batch: Vec<LinkRecord> = match self.get_json(&url).await {
                Ok(batch) => batch,
                // The API answers 400 for a page past the end when the total
                // is an exact multiple of per_page.
                Err(RepositoryError::Status { status: 400, .. }) if page > 1 => break,
                Err(e) => return Err(e),
            };
            let batch_len = batch.len();
            paths.extend(
                batch
                    .into_iter()
                    .map(|record| relativize(&self.site_url, &record.link)),
            );

            if let Some(n) = limit {
                if paths.len() >= n {
                    paths.truncate(n);
                    break;
                }
            }
            if batch_len < per_page {
                break;
            }
            page += 1;
        }

        Ok(paths)
    }

    async fn type_entry(&self, type_name: &str) -> Result<TypeEntry, RepositoryError> {
        if self.types.read().await.is_none() {
            self.content_types().await?;
        }
        let guard = self.types.read().await;
        guard
            .as_ref()
            .and_then(|map| map.get(type_name))
            .cloned()
            .ok_or_else(|| RepositoryError::UnknownType(type_name.to_string()))
    }

    async fn taxonomy_base(&self, taxonomy: &str) -> Result<String, RepositoryError> {
        if self.taxonomies.read().await.is_none() {
            self.taxonomies().await?;
        }
        let guard = self.taxonomies.read().await;
        guard
            .as_ref()
            .and_then(|map| map.get(taxonomy))
            .cloned()
            .ok_or_else(|| RepositoryError::UnknownTaxonomy(taxonomy.to_string()))
    }
}

#[async_trait]
impl ContentRepository for RestRepository {
    async fn content_types(&self) -> Result<Vec<ContentType>, RepositoryError> {
        let url = self.api_url("types");
        // BTreeMap keeps the registry (and therefore the report) in a
        // deterministic slug order.
        let records: BTreeMap<String, TypeRecord> = self.get_json(&url).await?;

        let mut entries = HashMap::with_capacity(records.len());
        let mut out = Vec::with_capacity(records.len());
        for record in records.into_values() {
            let rest_base = record
                .rest_base
                .clone()
                .unwrap_or_else(|| record.slug.clone());
            let archive = archive_path_from(&record.slug, &record.has_archive);
            out.push(ContentType {
                name: record.slug.clone(),
                public: record.viewable,
                publicly_queryable: record.viewable,
                has_archive: archive.is_some(),
            });
            entries.insert(record.slug, TypeEntry { rest_base, archive });
        }

        *self.types.write().await = Some(entries);
        Ok(out)
    }

    async fn items(
        &self,
        type_name: &str,
        limit: Option<usize>,
    ) -> Result<Vec<ContentItem>, RepositoryError> {
        let entry = self.type_entry(type_name).await?;
        let url = self.api_url(&entry.rest_base);
        let paths = self.fetch_links(&url, limit).await?;
        debug!(content_type = type_name, count = paths.len(), "listed items");
        Ok(paths.into_iter().map(|path| ContentItem { path }).collect())
    }

    async fn archive_path(&self, type_name: &str) -> Result<Option<String>, RepositoryError> {
        Ok(self.type_entry(type_name).await?.archive)
    }

    async fn taxonomies(&self) -> Result<Vec<Taxonomy>, RepositoryError> {
        let url = self.api_url("taxonomies");
        let records: BTreeMap<String, TaxonomyRecord> = self.get_json(&url).await?;

        let mut bases = HashMap::with_capacity(records.len());
        let mut out = Vec::with_capacity(records.len());
        for record in records.into_values() {
            let rest_base = record
                .rest_base
                .clone()
                .unwrap_or_else(|| record.slug.clone());
            let (public, publicly_queryable) = match record.visibility {
                Some(v) => (v.public, v.publicly_queryable),
                None => (true, true),
            };
            out.push(Taxonomy {
                name: record.slug.clone(),
                public,
                publicly_queryable,
            });
            bases.insert(record.slug, rest_base);
        }

        *self.taxonomies.write().await = Some(bases);
        Ok(out)
    }

    async fn terms(
        &self,
        taxonomy: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Term>, RepositoryError> {
        let rest_base = self.taxonomy_base(taxonomy).await?;
        let url = self.api_url(&rest_base);
        let paths = self.fetch_links(&url, limit).await?;
        debug!(taxonomy, count = paths.len(), "listed terms");
        Ok(paths.into_iter().map(|path| Term { path }).collect())
    }

    async fn named_page_path(&self, state: &str) -> Result<Option<String>, RepositoryError> {
        let Some(&page_id) = self.page_states.get(state) else {
            return Ok(None);
        };
        let url = self.api_url(&format!("pages/{page_id}"));
        let record: LinkRecord = self.get_json(&format!("{url}?_fields=link")).await?;
        Ok(Some(relativize(&self.site_url, &record.link)))
    }
}

/// Archive listing path for a type: `true` → `/{slug}/`, a custom slug
/// string → `/{custom}/`, anything else → no archive.
fn archive_path_from(slug: &str, has_archive: &serde_json::Value) -> Option<String> {
    match has_archive {
        serde_json::Value::Bool(true) => Some(format!("/{slug}/")),
        serde_json::Value::String(custom) if !custom.is_empty() => {
            Some(format!("/{}/", custom.trim_matches('/')))
        }
        _ => None,
    }
}

/// Reduce an inventory link to a site-relative path against `site_url`.
///
/// Links from the inventory are absolute; the probe layer re-prefixes the
/// base URL, so anything stored past this point must be relative.
fn relativize(site_url: &str, link: &str) -> String {
    if let Some(rest) = link.strip_prefix(site_url) {
        if rest.is_empty() {
            return "/".to_string();
        }
        if rest.starts_with('/') {
            return rest.to_string();
        }
        return format!("/{rest}");
    }
    if link.starts_with('/') {
        return link.to_string();
    }
    // Absolute link on a different host (e.g. the site serves from a CDN
    // alias): keep only the path component.
    if let Some(scheme_end) = link.find("://") {
        let host_and_path = &link[scheme_end + 3..];
        return match host_and_path.find('/') {
            Some(i) => host_and_path[i..].to_string(),
            None => "/".to_string(),
        };
    }
    format!("/{link}")
}

// ─── Tests ────────────────────────────────────────────────────────────────────
