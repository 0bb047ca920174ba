use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::admin::error::ApiError;
use crate::http::server::AppState;
use crate::permissions::{Permission, PermissionError, UserId};
use crate::sites::{CreateSite, Site, SiteId, UpdateSite};

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub sites: usize,
    pub default_site: Option<SiteId>,
    pub i18n_enabled: bool,
}

pub async fn get_status(State(state): State<AppState>) -> Result<Json<SystemStatus>, ApiError> {
    let services = state.services();
    let sites = services.sites.list()?;
    Ok(Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        sites: sites.len(),
        default_site: sites.iter().find(|s| s.is_default_site).map(|s| s.id),
        i18n_enabled: services.config.i18n.enabled,
    }))
}

pub async fn list_sites(State(state): State<AppState>) -> Result<Json<Vec<Site>>, ApiError> {
    Ok(Json(state.services().sites.list()?))
}

pub async fn get_site(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<Json<Site>, ApiError> {
    Ok(Json(state.services().sites.get(SiteId(id))?))
}

pub async fn create_site(
    State(state): State<AppState>,
    Json(input): Json<CreateSite>,
) -> Result<(StatusCode, Json<Site>), ApiError> {
    let site = state.services().sites.create(input)?;
    Ok((StatusCode::CREATED, Json(site)))
}

pub async fn update_site(
    State(state): State<AppState>,
    Path(id): Path<u32>,
    Json(changes): Json<UpdateSite>,
) -> Result<Json<Site>, ApiError> {
    Ok(Json(state.services().sites.update(SiteId(id), changes)?))
}

pub async fn delete_site(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<StatusCode, ApiError> {
    state.services().sites.delete(SiteId(id))?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_root_paths(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let paths = state.services().sites.root_paths().get_root_paths()?;
    let entries: Vec<_> = paths
        .into_iter()
        .map(|rp| {
            json!({
                "site_id": rp.site_id,
                "root_path": rp.root_path,
                "root_url": rp.root_url,
                "language_code": rp.language_code,
            })
        })
        .collect();
    Ok(Json(json!(entries)))
}

pub async fn invalidate_root_paths(State(state): State<AppState>) -> StatusCode {
    state.services().sites.root_paths().invalidate();
    StatusCode::NO_CONTENT
}

#[derive(Debug, Deserialize)]
pub struct PermissionCheck {
    pub site_id: SiteId,
    pub user_id: UserId,
    #[serde(default)]
    pub permissions: Vec<String>,
    /// App label to test module-level access for.
    pub module: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PermissionVerdict {
    pub allowed: bool,
    pub module_allowed: Option<bool>,
    pub granted: Vec<Permission>,
}

pub async fn check_permissions(
    State(state): State<AppState>,
    Json(check): Json<PermissionCheck>,
) -> Result<Json<PermissionVerdict>, ApiError> {
    let services = state.services();
    let user = state
        .store
        .site_user(check.site_id, check.user_id)
        .ok_or(PermissionError::UnknownSiteUser {
            site: check.site_id,
            user: check.user_id,
        })?;

    let perms = check
        .permissions
        .iter()
        .map(|p| p.parse::<Permission>())
        .collect::<Result<Vec<_>, _>>()?;

    let authorizer = &services.authorizer;
    let module_allowed = match &check.module {
        Some(app_label) => Some(authorizer.has_module_perms(&user, app_label)?),
        None => None,
    };

    Ok(Json(PermissionVerdict {
        allowed: authorizer.has_perms(&user, &perms, None)?,
        module_allowed,
        granted: authorizer.all_permissions(&user, None)?.into_iter().collect(),
    }))
}
