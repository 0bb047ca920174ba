//! Site-scoped users, groups and permission grants.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::permissions::PermissionError;
use crate::sites::SiteId;

/// A permission grant in `app_label.codename` form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Permission {
    pub app_label: String,
    pub codename: String,
}

impl Permission {
    pub fn new(app_label: impl Into<String>, codename: impl Into<String>) -> Self {
        Self {
            app_label: app_label.into(),
            codename: codename.into(),
        }
    }
}

impl FromStr for Permission {
    type Err = PermissionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('.') {
            Some((app_label, codename)) if !app_label.is_empty() && !codename.is_empty() => {
                Ok(Self::new(app_label, codename))
            }
            _ => Err(PermissionError::MalformedPermission(s.to_string())),
        }
    }
}

impl TryFrom<String> for Permission {
    type Error = PermissionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Permission> for String {
    fn from(value: Permission) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.app_label, self.codename)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u32);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named set of permissions owned by one site. `(name, site_id)` is unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteGroup {
    pub id: GroupId,
    pub site_id: SiteId,
    pub name: String,
    #[serde(default)]
    pub permissions: BTreeSet<Permission>,
}

/// Capabilities a per-site user record must provide.
pub trait SiteUser: Send + Sync + fmt::Debug {
    fn site_id(&self) -> SiteId;
    fn user_id(&self) -> UserId;
    fn is_active(&self) -> bool;
    fn is_superuser(&self) -> bool;
    fn group_ids(&self) -> &[GroupId];
    /// Permissions granted to the user directly.
    fn user_permissions(&self) -> &BTreeSet<Permission>;
}

/// The stock site user model, installed as `sites.SiteUser`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteMembership {
    pub site_id: SiteId,
    pub user_id: UserId,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub is_superuser: bool,
    #[serde(default)]
    pub groups: Vec<GroupId>,
    #[serde(default)]
    pub permissions: BTreeSet<Permission>,
}

fn default_active() -> bool {
    true
}

impl SiteMembership {
    pub fn new(site_id: SiteId, user_id: UserId) -> Self {
        Self {
            site_id,
            user_id,
            is_active: true,
            is_superuser: false,
            groups: Vec::new(),
            permissions: BTreeSet::new(),
        }
    }
}

impl SiteUser for SiteMembership {
    fn site_id(&self) -> SiteId {
        self.site_id
    }

    fn user_id(&self) -> UserId {
        self.user_id
    }

    fn is_active(&self) -> bool {
        self.is_active
    }

    fn is_superuser(&self) -> bool {
        self.is_superuser
    }

    fn group_ids(&self) -> &[GroupId] {
        &self.groups
    }

    fn user_permissions(&self) -> &BTreeSet<Permission> {
        &self.permissions
    }
}

/// Site user models compiled into this build, keyed by `app_label.ModelName`.
pub const INSTALLED_SITE_USER_MODELS: &[&str] = &["sites.SiteUser"];

/// A validated reference to an installed site user model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteUserModel {
    pub app_label: String,
    pub model_name: String,
}

impl SiteUserModel {
    /// Resolve the configured model setting. Runs once at startup.
    pub fn resolve(setting: &str) -> Result<Self, PermissionError> {
        let setting = setting.trim();
        if setting.is_empty() {
            return Err(PermissionError::ModelNotConfigured);
        }
        let (app_label, model_name) = match setting.split_once('.') {
            Some((app, model)) if !app.is_empty() && !model.is_empty() && !model.contains('.') => {
                (app, model)
            }
            _ => return Err(PermissionError::MalformedModel(setting.to_string())),
        };
        if !INSTALLED_SITE_USER_MODELS.contains(&setting) {
            return Err(PermissionError::ModelNotInstalled(setting.to_string()));
        }
        Ok(Self {
            app_label: app_label.to_string(),
            model_name: model_name.to_string(),
        })
    }
}
