// SPDX-License-Identifier: MIT
//! URL enumerator — decides which URLs a scan pass will probe.
//!
//! Emission order is fixed (content items, archives, taxonomy terms, named
//! state pages, home) so reports stay comparable between runs. Unresolvable
//! entries are skipped, never failed: a page nobody assigned is "nothing to
//! check", not "check failed".

use tracing::debug;

use crate::content::{ContentRepository, ContentType, RepositoryError, Taxonomy};

/// Content type whose items are probeable even without the queryable flag.
const PAGE_TYPE: &str = "page";

/// Media attachments resolve to file URLs, not rendered pages.
const ATTACHMENT_TYPE: &str = "attachment";

/// Built-in taxonomies reserved for tags, formats, and categories — their
/// term pages are templated separately and are not representative.
const RESERVED_TAXONOMIES: [&str; 3] = ["post_tag", "post_format", "category"];

/// One URL scheduled for probing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTarget {
    pub label: String,
    /// Site-relative path with a leading `/`.
    pub url: String,
}

impl ProbeTarget {
    fn new(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            url: url.into(),
        }
    }
}

fn probeable_type(content_type: &ContentType) -> bool {
    content_type.public
        && (content_type.publicly_queryable || content_type.name == PAGE_TYPE)
        && content_type.name != ATTACHMENT_TYPE
}

fn probeable_taxonomy(taxonomy: &Taxonomy) -> bool {
    taxonomy.public
        && taxonomy.publicly_queryable
        && !RESERVED_TAXONOMIES.contains(&taxonomy.name.as_str())
}

/// Build the ordered probe list for one scan pass.
///
/// `exhaustive = false` samples one item per content type and one term per
/// taxonomy; `true` enumerates everything. Listing failures propagate —
/// an unreachable inventory is an operational error, not a verdict — but
/// per-entry resolution failures (archives, named states) only skip that
/// entry.
pub async fn enumerate(
    repo: &dyn ContentRepository,
    page_states: &[String],
    exhaustive: bool,
) -> Result<Vec<ProbeTarget>, RepositoryError> {
    let mut targets = Vec::new();
    let limit = if exhaustive { None } else { Some(1) };

    for content_type in repo.content_types().await? {
        if !probeable_type(&content_type) {
            continue;
        }
        for item in repo.items(&content_type.name, limit).await? {
            targets.push(ProbeTarget::new(
                format!("Post {}", content_type.name),
                item.path,
            ));
        }
        if content_type.has_archive {
            match repo.archive_path(&content_type.name).await {
                Ok(Some(path)) => targets.push(ProbeTarget::new(
                    format!("Post {} archive", content_type.name),
                    path,
                )),
                Ok(None) => {}
                Err(e) => {
                    debug!(
                        content_type = %content_type.name,
                        error = %e,
                        "archive did not resolve — skipping"
                    );
                }
            }
        }
    }

    for taxonomy in repo.taxonomies().await? {
        if !probeable_taxonomy(&taxonomy) {
            continue;
        }
        for term in repo.terms(&taxonomy.name, limit).await? {
            targets.push(ProbeTarget::new(
                format!("Taxonomy {}", taxonomy.name),
                term.path,
            ));
        }
    }

    for state in page_states {
        match repo.named_page_path(state).await {
            Ok(Some(path)) => {
                targets.push(ProbeTarget::new(format!("State {state}"), path));
            }
            Ok(None) => {
                debug!(state = %state, "no page assigned to state — skipping");
            }
            Err(e) => {
                debug!(state = %state, error = %e, "state page did not resolve — skipping");
            }
        }
    }

    targets.push(ProbeTarget::new("Home", "/"));
    Ok(targets)
}

// ─── Tests ────────────────────────────────────────────────────────────────────
