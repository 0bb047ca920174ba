//! Admin API behaviour.

use axum::{body::Body, http::{Request, StatusCode}, Router};
use serde_json::json;
use site_router::admin::setup_admin_router;
use site_router::http::HttpServer;

mod common;

fn admin_router() -> (HttpServer, Router) {
    let server = HttpServer::new(common::test_config());
    let router = setup_admin_router(server.state());
    (server, router)
}

#[tokio::test]
async fn test_requires_bearer_key() {
    let (_server, router) = admin_router();

    let req = Request::builder().uri("/admin/status").body(Body::empty()).unwrap();
    let (status, _) = common::send(&router, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let req = Request::builder()
        .uri("/admin/status")
        .header("Authorization", "Bearer wrong")
        .body(Body::empty())
        .unwrap();
    let (status, _) = common::send(&router, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = common::admin(&router, "GET", "/admin/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sites"], 3);
    assert_eq!(body["default_site"], 1);
}

#[tokio::test]
async fn test_second_default_rejected() {
    let (_server, router) = admin_router();

    let (status, body) = common::admin(
        &router,
        "POST",
        "/admin/sites",
        Some(json!({ "hostname": "other.org", "root_page": 2, "is_default_site": true })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "is_default_site");
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("example.com is already configured as the default site"));
}

#[tokio::test]
async fn test_moving_the_default() {
    let (_server, router) = admin_router();

    let (status, _) = common::admin(
        &router,
        "PUT",
        "/admin/sites/1",
        Some(json!({ "is_default_site": false })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = common::admin(
        &router,
        "PUT",
        "/admin/sites/2",
        Some(json!({ "is_default_site": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_default_site"], true);

    // re-saving the default itself is fine
    let (status, _) = common::admin(
        &router,
        "PUT",
        "/admin/sites/2",
        Some(json!({ "site_name": "Blog" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_validation_errors() {
    let (_server, router) = admin_router();

    let (status, body) = common::admin(
        &router,
        "POST",
        "/admin/sites",
        Some(json!({ "hostname": "example.com", "root_page": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "hostname");

    let (status, _) = common::admin(
        &router,
        "POST",
        "/admin/sites",
        Some(json!({ "hostname": "bad host/", "root_page": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = common::admin(
        &router,
        "POST",
        "/admin/sites",
        Some(json!({ "hostname": "new.org", "root_page": 99 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = common::admin(&router, "GET", "/admin/sites/42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_writes_invalidate_root_paths() {
    let (server, router) = admin_router();

    let (_, before) = common::admin(&router, "GET", "/admin/root-paths", None).await;
    assert_eq!(before.as_array().unwrap().len(), 3);
    assert_eq!(before[0]["root_path"], "/home/blog/");

    let (status, created) = common::admin(
        &router,
        "POST",
        "/admin/sites",
        Some(json!({ "hostname": "fr.example.com", "port": 443, "root_page": 4 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, after) = common::admin(&router, "GET", "/admin/root-paths", None).await;
    let paths = after.as_array().unwrap();
    assert_eq!(paths.len(), 4);
    assert!(paths
        .iter()
        .any(|p| p["site_id"] == created["id"] && p["root_url"] == "https://fr.example.com"));

    let id = created["id"].as_u64().unwrap();
    let (status, _) = common::admin(&router, "DELETE", &format!("/admin/sites/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, after_delete) = common::admin(&router, "GET", "/admin/root-paths", None).await;
    assert_eq!(after_delete.as_array().unwrap().len(), 3);

    // the public router sees the same store
    let public = server.router();
    let (_, body) = common::get(&public, "fr.example.com:443", "/").await;
    assert_eq!(body["site"]["id"], 1);
}

#[tokio::test]
async fn test_explicit_invalidation_forces_recompute() {
    let (server, router) = admin_router();

    common::admin(&router, "GET", "/admin/root-paths", None).await;
    let queries = server.state().store.query_count();

    // served from cache
    common::admin(&router, "GET", "/admin/root-paths", None).await;
    assert_eq!(server.state().store.query_count(), queries);

    let (status, _) = common::admin(&router, "POST", "/admin/root-paths/invalidate", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    common::admin(&router, "GET", "/admin/root-paths", None).await;
    assert!(server.state().store.query_count() > queries);
}

#[tokio::test]
async fn test_permission_check() {
    let (_server, router) = admin_router();

    let check = |user: u32, perms: &[&str]| {
        json!({ "site_id": 1, "user_id": user, "permissions": perms, "module": "pages" })
    };

    // group grant plus a direct grant
    let (status, body) = common::admin(
        &router,
        "POST",
        "/admin/permissions/check",
        Some(check(10, &["pages.change_page", "images.add_image"])),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["allowed"], true);
    assert_eq!(body["module_allowed"], true);

    let (_, body) = common::admin(
        &router,
        "POST",
        "/admin/permissions/check",
        Some(check(10, &["pages.delete_page"])),
    )
    .await;
    assert_eq!(body["allowed"], false);

    // active superuser
    let (_, body) = common::admin(
        &router,
        "POST",
        "/admin/permissions/check",
        Some(check(11, &["anything.at_all"])),
    )
    .await;
    assert_eq!(body["allowed"], true);

    // inactive superuser gets nothing
    let (_, body) = common::admin(
        &router,
        "POST",
        "/admin/permissions/check",
        Some(check(12, &["pages.change_page"])),
    )
    .await;
    assert_eq!(body["allowed"], false);
    assert_eq!(body["module_allowed"], false);
    assert_eq!(body["granted"], json!([]));

    let (status, _) = common::admin(
        &router,
        "POST",
        "/admin/permissions/check",
        Some(check(99, &["pages.change_page"])),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = common::admin(
        &router,
        "POST",
        "/admin/permissions/check",
        Some(check(10, &["change_page"])),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_reload_replaces_sites_and_evicts_root_paths() {
    let (server, router) = admin_router();
    common::admin(&router, "GET", "/admin/root-paths", None).await;

    let mut config = common::test_config();
    config.sites.retain(|s| s.id.0 == 1);
    server.state().reload(config);

    let (_, sites) = common::admin(&router, "GET", "/admin/sites", None).await;
    assert_eq!(sites.as_array().unwrap().len(), 1);

    let (_, paths) = common::admin(&router, "GET", "/admin/root-paths", None).await;
    assert_eq!(paths.as_array().unwrap().len(), 1);
}
