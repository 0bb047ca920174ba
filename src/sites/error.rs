//! Error types for site resolution and site writes.

use thiserror::Error;

use crate::sites::model::{PageId, SiteId};

#[derive(Debug, Error)]
pub enum SiteError {
    #[error("No site matches {hostname}:{port}")]
    NotFound { hostname: String, port: u16 },

    #[error("Site {0} does not exist")]
    UnknownSite(SiteId),

    #[error("Page {0} does not exist")]
    UnknownPage(PageId),

    #[error(
        "{hostname} is already configured as the default site. \
         You must unset that before you can save this site as default."
    )]
    DefaultConflict { hostname: String },

    #[error("Site with this hostname and port already exists: {hostname}:{port}")]
    DuplicateHost { hostname: String, port: u16 },

    #[error("Invalid {field}: {message}")]
    Invalid { field: &'static str, message: String },

    /// More than one site is flagged default; storage is corrupt.
    #[error("{count} sites are flagged as the default site")]
    MultipleDefaults { count: usize },

    #[error("Storage error: {0}")]
    Storage(String),
}

impl SiteError {
    /// Errors caused by the submitted data rather than the system state.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            SiteError::DefaultConflict { .. }
                | SiteError::DuplicateHost { .. }
                | SiteError::Invalid { .. }
                | SiteError::UnknownPage(_)
        )
    }

    /// Name of the offending field for validation errors.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            SiteError::DefaultConflict { .. } => Some("is_default_site"),
            SiteError::DuplicateHost { .. } => Some("hostname"),
            SiteError::Invalid { field, .. } => Some(field),
            SiteError::UnknownPage(_) => Some("root_page"),
            _ => None,
        }
    }
}

pub type SiteResult<T> = Result<T, SiteError>;
