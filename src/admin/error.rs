//! Admin API error responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::permissions::PermissionError;
use crate::sites::SiteError;

#[derive(Debug)]
pub enum ApiError {
    Site(SiteError),
    Permission(PermissionError),
}

impl From<SiteError> for ApiError {
    fn from(e: SiteError) -> Self {
        ApiError::Site(e)
    }
}

impl From<PermissionError> for ApiError {
    fn from(e: PermissionError) -> Self {
        ApiError::Permission(e)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Site(e) if e.is_validation() => StatusCode::BAD_REQUEST,
            ApiError::Site(SiteError::UnknownSite(_)) | ApiError::Site(SiteError::NotFound { .. }) => {
                StatusCode::NOT_FOUND
            }
            ApiError::Site(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Permission(PermissionError::MalformedPermission(_)) => StatusCode::BAD_REQUEST,
            ApiError::Permission(PermissionError::UnknownSiteUser { .. }) => StatusCode::NOT_FOUND,
            ApiError::Permission(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::Site(e) => json!({ "error": e.to_string(), "field": e.field() }),
            ApiError::Permission(e) => json!({ "error": e.to_string() }),
        };
        if status.is_server_error() {
            tracing::error!(error = ?self, "Admin request failed");
        }
        (status, Json(body)).into_response()
    }
}
