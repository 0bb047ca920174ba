//! Admin API.
//!
//! Served on its own listener and guarded by a bearer key. Every site
//! mutation goes through `SiteManager`, so validation and root path cache
//! invalidation behave exactly as for any other caller.

pub mod auth;
pub mod error;
pub mod handlers;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use self::auth::admin_auth_middleware;
use self::handlers::*;
use crate::http::server::AppState;

pub fn setup_admin_router(state: AppState) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/sites", get(list_sites).post(create_site))
        .route(
            "/admin/sites/{id}",
            get(get_site).put(update_site).delete(delete_site),
        )
        .route("/admin/root-paths", get(get_root_paths))
        .route("/admin/root-paths/invalidate", post(invalidate_root_paths))
        .route("/admin/permissions/check", post(check_permissions))
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .with_state(state)
}
