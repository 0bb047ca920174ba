//! Shared utilities for integration tests.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use site_router::config::{parse_config, SiteRouterConfig};
use tower::ServiceExt;

pub const ADMIN_KEY: &str = "test-admin-key";

pub const CONFIG: &str = r#"
[listener]
bind_address = "127.0.0.1:80"

[admin]
enabled = true
api_key = "test-admin-key"

[[pages]]
id = 2
url_path = "/home/"
locale = "en"
translation_key = "home"

[[pages]]
id = 3
url_path = "/home/blog/"
locale = "en"

[[pages]]
id = 4
url_path = "/home-fr/"
locale = "fr"
translation_key = "home"

[[sites]]
id = 1
hostname = "example.com"
site_name = "Example"
root_page = 2
is_default_site = true

[[sites]]
id = 2
hostname = "blog.example.com"
root_page = 3

[[sites]]
id = 3
hostname = "localhost"
port = 8000
site_name = "Dev"
root_page = 2

[[groups]]
id = 1
site_id = 1
name = "Editors"
permissions = ["pages.change_page", "pages.add_page"]

[[site_users]]
site_id = 1
user_id = 10
groups = [1]
permissions = ["images.add_image"]

[[site_users]]
site_id = 1
user_id = 11
is_superuser = true

[[site_users]]
site_id = 1
user_id = 12
is_active = false
is_superuser = true
groups = [1]
"#;

pub fn test_config() -> SiteRouterConfig {
    parse_config(CONFIG).unwrap()
}

/// Send a request through the router and decode the JSON body (Null when empty).
pub async fn send(router: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let res = router.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

/// GET `path` with the given Host header.
pub async fn get(router: &Router, host: &str, path: &str) -> (StatusCode, Value) {
    let req = Request::builder()
        .uri(path)
        .header("Host", host)
        .body(Body::empty())
        .unwrap();
    send(router, req).await
}

/// Authorized admin request, with an optional JSON body.
pub async fn admin(router: &Router, method: &str, path: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder()
        .method(method)
        .uri(path)
        .header("Authorization", format!("Bearer {ADMIN_KEY}"));
    let req = match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    send(router, req).await
}
