//! RestRepository against a fake CMS inventory served in-process.

mod common;

use std::collections::{BTreeMap, HashMap};

use sitepulse::content::{ContentRepository, RepositoryError, RestRepository};

/// Serve a small inventory: four content types, two taxonomies, a posts
/// collection, a genre term collection, and one named page.
async fn start_inventory() -> (RestRepository, String) {
    let (listener, base) = common::bind().await;

    let types = serde_json::json!({
        "post": { "slug": "post", "viewable": true, "has_archive": false, "rest_base": "posts" },
        "page": { "slug": "page", "viewable": true, "has_archive": false, "rest_base": "pages" },
        "attachment": { "slug": "attachment", "viewable": true, "has_archive": false, "rest_base": "media" },
        "movie": { "slug": "movie", "viewable": true, "has_archive": "films", "rest_base": "movies" },
        "internal_note": { "slug": "internal_note", "viewable": false, "has_archive": false }
    });
    let taxonomies = serde_json::json!({
        "category": { "slug": "category", "rest_base": "categories" },
        "genre": { "slug": "genre", "rest_base": "genre" }
    });
    let posts = serde_json::json!([
        { "link": format!("{base}/hello-world/") },
        { "link": format!("{base}/second-post/") }
    ]);
    let genre_terms = serde_json::json!([
        { "link": "/genre/jazz/" },
        { "link": format!("{base}/genre/blues/") }
    ]);
    let maintenance_page = serde_json::json!({ "link": format!("{base}/maintenance/") });

    let mut pages: HashMap<String, (u16, String)> = HashMap::new();
    pages.insert("/wp-json/wp/v2/types".into(), (200, types.to_string()));
    pages.insert(
        "/wp-json/wp/v2/taxonomies".into(),
        (200, taxonomies.to_string()),
    );
    pages.insert("/wp-json/wp/v2/posts".into(), (200, posts.to_string()));
    pages.insert("/wp-json/wp/v2/genre".into(), (200, genre_terms.to_string()));
    pages.insert(
        "/wp-json/wp/v2/pages/12".into(),
        (200, maintenance_page.to_string()),
    );
    common::serve(listener, pages);

    let mut page_states = BTreeMap::new();
    page_states.insert("maintenance".to_string(), 12u64);
    page_states.insert("ghost".to_string(), 99u64);

    let repo = RestRepository::new(base.clone(), common::client(), page_states);
    (repo, base)
}

#[tokio::test]
async fn test_content_types_mapping() {
    let (repo, _base) = start_inventory().await;
    let types = repo.content_types().await.unwrap();

    // Deterministic slug order.
    let names: Vec<&str> = types.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["attachment", "internal_note", "movie", "page", "post"]
    );

    let movie = types.iter().find(|t| t.name == "movie").unwrap();
    assert!(movie.public);
    assert!(movie.has_archive);

    let hidden = types.iter().find(|t| t.name == "internal_note").unwrap();
    assert!(!hidden.public);
    assert!(!hidden.publicly_queryable);
}

#[tokio::test]
async fn test_archive_path_uses_custom_slug() {
    let (repo, _base) = start_inventory().await;
    assert_eq!(
        repo.archive_path("movie").await.unwrap(),
        Some("/films/".to_string())
    );
    assert_eq!(repo.archive_path("post").await.unwrap(), None);
}

#[tokio::test]
async fn test_items_are_relativized_and_limited() {
    let (repo, _base) = start_inventory().await;

    let all = repo.items("post", None).await.unwrap();
    let paths: Vec<&str> = all.iter().map(|i| i.path.as_str()).collect();
    assert_eq!(paths, vec!["/hello-world/", "/second-post/"]);

    let sampled = repo.items("post", Some(1)).await.unwrap();
    assert_eq!(sampled.len(), 1);
    assert_eq!(sampled[0].path, "/hello-world/");
}

#[tokio::test]
async fn test_unknown_type_is_an_error() {
    let (repo, _base) = start_inventory().await;
    let err = repo.items("banana", None).await.unwrap_err();
    assert!(matches!(err, RepositoryError::UnknownType(_)));
}

#[tokio::test]
async fn test_taxonomies_and_terms() {
    let (repo, _base) = start_inventory().await;

    let taxonomies = repo.taxonomies().await.unwrap();
    let names: Vec<&str> = taxonomies.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["category", "genre"]);
    // Listed without a visibility object → treated as public and queryable.
    assert!(taxonomies.iter().all(|t| t.public && t.publicly_queryable));

    let terms = repo.terms("genre", None).await.unwrap();
    let paths: Vec<&str> = terms.iter().map(|t| t.path.as_str()).collect();
    assert_eq!(paths, vec!["/genre/jazz/", "/genre/blues/"]);
}

#[tokio::test]
async fn test_named_page_resolution() {
    let (repo, _base) = start_inventory().await;

    // Assigned and resolvable.
    assert_eq!(
        repo.named_page_path("maintenance").await.unwrap(),
        Some("/maintenance/".to_string())
    );

    // Not in the page_states map at all.
    assert_eq!(repo.named_page_path("unknown").await.unwrap(), None);

    // Mapped to a page the inventory no longer has.
    let err = repo.named_page_path("ghost").await.unwrap_err();
    assert!(matches!(err, RepositoryError::Status { status: 404, .. }));
}
