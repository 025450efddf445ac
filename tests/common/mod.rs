//! Shared fixtures for the integration tests: an in-memory content
//! inventory and a fake site served from an in-process axum server.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use axum::{body::Body, http::Request, response::Response, Router};
use tokio::net::TcpListener;

use sitepulse::content::{
    ContentItem, ContentRepository, ContentType, RepositoryError, Taxonomy, Term,
};

// ─── In-memory inventory ──────────────────────────────────────────────────────

pub enum StateResolution {
    Page(String),
    Unassigned,
    Broken,
}

#[derive(Default)]
pub struct StaticRepository {
    types: Vec<(ContentType, Vec<ContentItem>, Option<String>)>,
    taxonomies: Vec<(Taxonomy, Vec<Term>)>,
    states: BTreeMap<String, StateResolution>,
}

pub fn content_type(name: &str, public: bool, queryable: bool, has_archive: bool) -> ContentType {
    ContentType {
        name: name.to_string(),
        public,
        publicly_queryable: queryable,
        has_archive,
    }
}

pub fn taxonomy(name: &str, public: bool, queryable: bool) -> Taxonomy {
    Taxonomy {
        name: name.to_string(),
        public,
        publicly_queryable: queryable,
    }
}

impl StaticRepository {
    pub fn with_type(
        mut self,
        content_type: ContentType,
        item_paths: &[&str],
        archive: Option<&str>,
    ) -> Self {
        let items = item_paths
            .iter()
            .map(|p| ContentItem {
                path: (*p).to_string(),
            })
            .collect();
        self.types
            .push((content_type, items, archive.map(str::to_string)));
        self
    }

    pub fn with_taxonomy(mut self, taxonomy: Taxonomy, term_paths: &[&str]) -> Self {
        let terms = term_paths
            .iter()
            .map(|p| Term {
                path: (*p).to_string(),
            })
            .collect();
        self.taxonomies.push((taxonomy, terms));
        self
    }

    pub fn with_state(mut self, state: &str, resolution: StateResolution) -> Self {
        self.states.insert(state.to_string(), resolution);
        self
    }
}

#[async_trait]
impl ContentRepository for StaticRepository {
    async fn content_types(&self) -> Result<Vec<ContentType>, RepositoryError> {
        Ok(self.types.iter().map(|(t, _, _)| t.clone()).collect())
    }

    async fn items(
        &self,
        type_name: &str,
        limit: Option<usize>,
    ) -> Result<Vec<ContentItem>, RepositoryError> {
        let (_, items, _) = self
            .types
            .iter()
            .find(|(t, _, _)| t.name == type_name)
            .ok_or_else(|| RepositoryError::UnknownType(type_name.to_string()))?;
        let mut items = items.clone();
        if let Some(n) = limit {
            items.truncate(n);
        }
        Ok(items)
    }

    async fn archive_path(&self, type_name: &str) -> Result<Option<String>, RepositoryError> {
        let (_, _, archive) = self
            .types
            .iter()
            .find(|(t, _, _)| t.name == type_name)
            .ok_or_else(|| RepositoryError::UnknownType(type_name.to_string()))?;
        Ok(archive.clone())
    }

    async fn taxonomies(&self) -> Result<Vec<Taxonomy>, RepositoryError> {
        Ok(self.taxonomies.iter().map(|(t, _)| t.clone()).collect())
    }

    async fn terms(
        &self,
        taxonomy: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Term>, RepositoryError> {
        let (_, terms) = self
            .taxonomies
            .iter()
            .find(|(t, _)| t.name == taxonomy)
            .ok_or_else(|| RepositoryError::UnknownTaxonomy(taxonomy.to_string()))?;
        let mut terms = terms.clone();
        if let Some(n) = limit {
            terms.truncate(n);
        }
        Ok(terms)
    }

    async fn named_page_path(&self, state: &str) -> Result<Option<String>, RepositoryError> {
        match self.states.get(state) {
            Some(StateResolution::Page(path)) => Ok(Some(path.clone())),
            Some(StateResolution::Unassigned) | None => Ok(None),
            Some(StateResolution::Broken) => Err(RepositoryError::Status {
                status: 500,
                url: format!("/states/{state}"),
            }),
        }
    }
}

/// An inventory that is down entirely.
pub struct UnreachableRepository;

#[async_trait]
impl ContentRepository for UnreachableRepository {
    async fn content_types(&self) -> Result<Vec<ContentType>, RepositoryError> {
        Err(RepositoryError::Status {
            status: 503,
            url: "/wp-json/wp/v2/types".to_string(),
        })
    }

    async fn items(
        &self,
        type_name: &str,
        _limit: Option<usize>,
    ) -> Result<Vec<ContentItem>, RepositoryError> {
        Err(RepositoryError::UnknownType(type_name.to_string()))
    }

    async fn archive_path(&self, type_name: &str) -> Result<Option<String>, RepositoryError> {
        Err(RepositoryError::UnknownType(type_name.to_string()))
    }

    async fn taxonomies(&self) -> Result<Vec<Taxonomy>, RepositoryError> {
        Err(RepositoryError::Status {
            status: 503,
            url: "/wp-json/wp/v2/taxonomies".to_string(),
        })
    }

    async fn terms(
        &self,
        taxonomy: &str,
        _limit: Option<usize>,
    ) -> Result<Vec<Term>, RepositoryError> {
        Err(RepositoryError::UnknownTaxonomy(taxonomy.to_string()))
    }

    async fn named_page_path(&self, _state: &str) -> Result<Option<String>, RepositoryError> {
        Ok(None)
    }
}

// ─── Fake site server ─────────────────────────────────────────────────────────

/// Bind a random local port, returning the listener and its base URL.
pub async fn bind() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    (listener, base)
}

/// Serve `pages` (request path → status + body) on the listener; anything
/// else answers 404. Query strings are ignored for matching.
pub fn serve(listener: TcpListener, pages: HashMap<String, (u16, String)>) {
    let app = Router::new().fallback(move |req: Request<Body>| {
        let pages = pages.clone();
        async move {
            let path = req.uri().path().to_string();
            match pages.get(&path) {
                Some((status, body)) => Response::builder()
                    .status(*status)
                    .body(Body::from(body.clone()))
                    .unwrap(),
                None => Response::builder()
                    .status(404)
                    .body(Body::from("not found".to_string()))
                    .unwrap(),
            }
        }
    });
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
}

/// One-step fake site: serve the given pages and return the base URL.
pub async fn serve_site(pages: &[(&str, u16, &str)]) -> String {
    let (listener, base) = bind().await;
    let map = pages
        .iter()
        .map(|(path, status, body)| ((*path).to_string(), (*status, (*body).to_string())))
        .collect();
    serve(listener, map);
    base
}

/// A minimal page body that passes the validity classification.
pub fn healthy_body(text: &str) -> String {
    format!("<html><head><title>t</title></head><body>{text}</body></html>")
}

// ─── Scanner plumbing ─────────────────────────────────────────────────────────

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(5))
        .build()
        .unwrap()
}

/// A scanner probing `base_url` with default fan-out and no auth token.
pub fn scanner(base_url: &str) -> sitepulse::scan::Scanner {
    let prober = sitepulse::scan::Prober::new(client(), base_url, None);
    sitepulse::scan::Scanner::new(prober, 4)
}
