//! Per-site users, groups and authorization.
//!
//! # Data Flow
//! ```text
//! SiteMembership (site, user, flags, groups, direct grants)
//!     → Authorizer (superuser bypass)
//!     → policy chain (ModelPolicy reads groups via GroupRepository)
//!     → bool / permission set
//! ```
//!
//! # Design Decisions
//! - The site user model is chosen at startup (`site_user_model`), never looked up lazily
//! - Groups are owned by one site and removed with it

pub mod error;
pub mod model;
pub mod policy;

pub use error::{PermissionError, PermissionResult};
pub use model::{
    GroupId, Permission, SiteGroup, SiteMembership, SiteUser, SiteUserModel, UserId,
    INSTALLED_SITE_USER_MODELS,
};
pub use policy::{AuthorizationPolicy, Authorizer, GroupRepository, ModelPolicy};
