//! Authorization policies.
//!
//! # Responsibilities
//! - Answer permission queries for a site user
//! - Chain several policies in a fixed order
//! - Short-circuit active superusers before any policy runs
//!
//! # Design Decisions
//! - First policy granting a permission wins
//! - A policy returning `PermissionError::Denied` stops the chain with "no"
//! - Object-level grants are not modelled by `ModelPolicy`

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::permissions::error::{PermissionError, PermissionResult};
use crate::permissions::model::{GroupId, Permission, SiteGroup, SiteUser};
use crate::sites::SiteId;

/// Read access to site groups.
pub trait GroupRepository: Send + Sync {
    fn groups(&self, site_id: SiteId, ids: &[GroupId]) -> PermissionResult<Vec<SiteGroup>>;
}

/// A source of permission decisions.
pub trait AuthorizationPolicy: Send + Sync {
    /// Permissions granted to the user directly.
    fn user_permissions(
        &self,
        user: &dyn SiteUser,
        obj: Option<&str>,
    ) -> PermissionResult<BTreeSet<Permission>>;

    /// Permissions granted through the user's groups.
    fn group_permissions(
        &self,
        user: &dyn SiteUser,
        obj: Option<&str>,
    ) -> PermissionResult<BTreeSet<Permission>>;

    fn all_permissions(
        &self,
        user: &dyn SiteUser,
        obj: Option<&str>,
    ) -> PermissionResult<BTreeSet<Permission>> {
        let mut perms = self.user_permissions(user, obj)?;
        perms.extend(self.group_permissions(user, obj)?);
        Ok(perms)
    }

    fn has_perm(
        &self,
        user: &dyn SiteUser,
        perm: &Permission,
        obj: Option<&str>,
    ) -> PermissionResult<bool> {
        Ok(user.is_active() && self.all_permissions(user, obj)?.contains(perm))
    }

    fn has_module_perms(&self, user: &dyn SiteUser, app_label: &str) -> PermissionResult<bool> {
        Ok(user.is_active()
            && self
                .all_permissions(user, None)?
                .iter()
                .any(|p| p.app_label == app_label))
    }
}

/// Grants stored on the user record and its groups.
pub struct ModelPolicy {
    groups: Arc<dyn GroupRepository>,
}

impl ModelPolicy {
    pub fn new(groups: Arc<dyn GroupRepository>) -> Self {
        Self { groups }
    }
}

impl AuthorizationPolicy for ModelPolicy {
    fn user_permissions(
        &self,
        user: &dyn SiteUser,
        obj: Option<&str>,
    ) -> PermissionResult<BTreeSet<Permission>> {
        if !user.is_active() || obj.is_some() {
            return Ok(BTreeSet::new());
        }
        Ok(user.user_permissions().clone())
    }

    fn group_permissions(
        &self,
        user: &dyn SiteUser,
        obj: Option<&str>,
    ) -> PermissionResult<BTreeSet<Permission>> {
        if !user.is_active() || obj.is_some() {
            return Ok(BTreeSet::new());
        }
        let groups = self.groups.groups(user.site_id(), user.group_ids())?;
        Ok(groups
            .into_iter()
            .flat_map(|g| g.permissions.into_iter())
            .collect())
    }
}

/// Ordered policy chain with the superuser bypass in front.
#[derive(Clone, Default)]
pub struct Authorizer {
    policies: Vec<Arc<dyn AuthorizationPolicy>>,
}

impl Authorizer {
    pub fn new(policies: Vec<Arc<dyn AuthorizationPolicy>>) -> Self {
        Self { policies }
    }

    /// Append a policy to the end of the chain.
    pub fn with_policy(mut self, policy: Arc<dyn AuthorizationPolicy>) -> Self {
        self.policies.push(policy);
        self
    }

    fn bypass(user: &dyn SiteUser) -> bool {
        user.is_active() && user.is_superuser()
    }

    pub fn user_permissions(
        &self,
        user: &dyn SiteUser,
        obj: Option<&str>,
    ) -> PermissionResult<BTreeSet<Permission>> {
        let mut perms = BTreeSet::new();
        for policy in &self.policies {
            perms.extend(policy.user_permissions(user, obj)?);
        }
        Ok(perms)
    }

    pub fn group_permissions(
        &self,
        user: &dyn SiteUser,
        obj: Option<&str>,
    ) -> PermissionResult<BTreeSet<Permission>> {
        let mut perms = BTreeSet::new();
        for policy in &self.policies {
            perms.extend(policy.group_permissions(user, obj)?);
        }
        Ok(perms)
    }

    pub fn all_permissions(
        &self,
        user: &dyn SiteUser,
        obj: Option<&str>,
    ) -> PermissionResult<BTreeSet<Permission>> {
        let mut perms = BTreeSet::new();
        for policy in &self.policies {
            perms.extend(policy.all_permissions(user, obj)?);
        }
        Ok(perms)
    }

    pub fn has_perm(
        &self,
        user: &dyn SiteUser,
        perm: &Permission,
        obj: Option<&str>,
    ) -> PermissionResult<bool> {
        if Self::bypass(user) {
            return Ok(true);
        }
        for policy in &self.policies {
            match policy.has_perm(user, perm, obj) {
                Ok(true) => return Ok(true),
                Ok(false) => {}
                Err(PermissionError::Denied) => return Ok(false),
                Err(e) => return Err(e),
            }
        }
        Ok(false)
    }

    /// True only if every permission in `perms` is held.
    pub fn has_perms(
        &self,
        user: &dyn SiteUser,
        perms: &[Permission],
        obj: Option<&str>,
    ) -> PermissionResult<bool> {
        for perm in perms {
            if !self.has_perm(user, perm, obj)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    pub fn has_module_perms(&self, user: &dyn SiteUser, app_label: &str) -> PermissionResult<bool> {
        if Self::bypass(user) {
            return Ok(true);
        }
        for policy in &self.policies {
            match policy.has_module_perms(user, app_label) {
                Ok(true) => return Ok(true),
                Ok(false) => {}
                Err(PermissionError::Denied) => return Ok(false),
                Err(e) => return Err(e),
            }
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permissions::model::{SiteMembership, UserId};

    struct FixedGroups(Vec<SiteGroup>);

    impl GroupRepository for FixedGroups {
        fn groups(&self, site_id: SiteId, ids: &[GroupId]) -> PermissionResult<Vec<SiteGroup>> {
            Ok(self
                .0
                .iter()
                .filter(|g| g.site_id == site_id && ids.contains(&g.id))
                .cloned()
                .collect())
        }
    }

    struct DenyAll;

    impl AuthorizationPolicy for DenyAll {
        fn user_permissions(
            &self,
            _user: &dyn SiteUser,
            _obj: Option<&str>,
        ) -> PermissionResult<BTreeSet<Permission>> {
            Ok(BTreeSet::new())
        }

        fn group_permissions(
            &self,
            _user: &dyn SiteUser,
            _obj: Option<&str>,
        ) -> PermissionResult<BTreeSet<Permission>> {
            Ok(BTreeSet::new())
        }

        fn has_perm(
            &self,
            _user: &dyn SiteUser,
            _perm: &Permission,
            _obj: Option<&str>,
        ) -> PermissionResult<bool> {
            Err(PermissionError::Denied)
        }
    }

    fn perm(s: &str) -> Permission {
        s.parse().unwrap()
    }

    fn authorizer() -> Authorizer {
        let editors = SiteGroup {
            id: GroupId(1),
            site_id: SiteId(1),
            name: "Editors".into(),
            permissions: [perm("pages.change_page")].into_iter().collect(),
        };
        let foreign = SiteGroup {
            id: GroupId(2),
            site_id: SiteId(2),
            name: "Editors".into(),
            permissions: [perm("pages.delete_page")].into_iter().collect(),
        };
        let groups: Arc<dyn GroupRepository> = Arc::new(FixedGroups(vec![editors, foreign]));
        Authorizer::default().with_policy(Arc::new(ModelPolicy::new(groups)))
    }

    fn member() -> SiteMembership {
        let mut user = SiteMembership::new(SiteId(1), UserId(7));
        user.groups = vec![GroupId(1), GroupId(2)];
        user.permissions.insert(perm("pages.add_page"));
        user
    }

    #[test]
    fn test_direct_and_group_permissions() {
        let auth = authorizer();
        let user = member();

        assert!(auth.has_perm(&user, &perm("pages.add_page"), None).unwrap());
        assert!(auth.has_perm(&user, &perm("pages.change_page"), None).unwrap());
        // group 2 belongs to another site
        assert!(!auth.has_perm(&user, &perm("pages.delete_page"), None).unwrap());

        let all = auth.all_permissions(&user, None).unwrap();
        assert_eq!(all.len(), 2);
        assert!(auth
            .has_perms(&user, &[perm("pages.add_page"), perm("pages.change_page")], None)
            .unwrap());
        assert!(!auth
            .has_perms(&user, &[perm("pages.add_page"), perm("images.add_image")], None)
            .unwrap());
    }

    #[test]
    fn test_object_level_queries_grant_nothing() {
        let auth = authorizer();
        let user = member();
        assert!(!auth.has_perm(&user, &perm("pages.add_page"), Some("page:3")).unwrap());
        assert!(auth.user_permissions(&user, Some("page:3")).unwrap().is_empty());
    }

    #[test]
    fn test_superuser_bypass_requires_active() {
        let auth = authorizer();
        let mut user = SiteMembership::new(SiteId(1), UserId(1));
        user.is_superuser = true;
        assert!(auth.has_perm(&user, &perm("images.delete_image"), None).unwrap());
        assert!(auth.has_module_perms(&user, "images").unwrap());

        user.is_active = false;
        assert!(!auth.has_perm(&user, &perm("images.delete_image"), None).unwrap());
        assert!(!auth.has_module_perms(&user, "images").unwrap());
    }

    #[test]
    fn test_inactive_user_has_nothing() {
        let auth = authorizer();
        let mut user = member();
        user.is_active = false;
        assert!(!auth.has_perm(&user, &perm("pages.add_page"), None).unwrap());
        assert!(auth.all_permissions(&user, None).unwrap().is_empty());
    }

    #[test]
    fn test_module_perms() {
        let auth = authorizer();
        let user = member();
        assert!(auth.has_module_perms(&user, "pages").unwrap());
        assert!(!auth.has_module_perms(&user, "images").unwrap());
    }

    #[test]
    fn test_denied_stops_chain() {
        let groups: Arc<dyn GroupRepository> = Arc::new(FixedGroups(Vec::new()));
        let auth = Authorizer::new(vec![
            Arc::new(DenyAll),
            Arc::new(ModelPolicy::new(groups)),
        ]);
        let user = member();
        assert!(!auth.has_perm(&user, &perm("pages.add_page"), None).unwrap());
    }
}
