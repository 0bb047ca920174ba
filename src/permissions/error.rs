//! Permission and site-user model errors.

use thiserror::Error;

use crate::permissions::model::UserId;
use crate::sites::SiteId;

#[derive(Debug, Error)]
pub enum PermissionError {
    #[error("Permission must be of the form 'app_label.codename', got '{0}'")]
    MalformedPermission(String),

    #[error("Please configure site_user_model with a model implementing the site user capabilities")]
    ModelNotConfigured,

    #[error("site_user_model must be of the form 'app_label.ModelName', got '{0}'")]
    MalformedModel(String),

    #[error("site_user_model refers to model '{0}' that has not been installed")]
    ModelNotInstalled(String),

    /// Raised by a policy to stop the chain and refuse outright.
    #[error("Permission denied")]
    Denied,

    #[error("User {user} is not a member of site {site}")]
    UnknownSiteUser { site: SiteId, user: UserId },

    #[error("Storage error: {0}")]
    Storage(String),
}

pub type PermissionResult<T> = Result<T, PermissionError>;
