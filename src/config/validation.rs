//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (sites reference pages, users reference groups)
//! - Enforce the site invariants on seed data (unique host/port, one default)
//! - Resolve the site user model so misconfiguration fails at startup
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: SiteRouterConfig → Result<(), Vec<ValidationError>>

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::config::schema::SiteRouterConfig;
use crate::permissions::SiteUserModel;
use crate::sites::cache::MAX_CACHE_TTL;
use crate::sites::manager::validate_hostname;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending setting, e.g. `sites[2].port`.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub fn validate_config(config: &SiteRouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = SiteUserModel::resolve(&config.site_user_model) {
        errors.push(ValidationError::new("site_user_model", e.to_string()));
    }
    let ttl = config.cache.root_paths_ttl_secs;
    if ttl == 0 || ttl > MAX_CACHE_TTL.as_secs() {
        errors.push(ValidationError::new(
            "cache.root_paths_ttl_secs",
            format!("must be between 1 and {}", MAX_CACHE_TTL.as_secs()),
        ));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new(
            "timeouts.request_secs",
            "must be greater than zero",
        ));
    }
    if config.admin.enabled && config.admin.api_key.trim().is_empty() {
        errors.push(ValidationError::new(
            "admin.api_key",
            "must be set when the admin API is enabled",
        ));
    }

    validate_pages(config, &mut errors);
    validate_sites(config, &mut errors);
    validate_permissions(config, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_pages(config: &SiteRouterConfig, errors: &mut Vec<ValidationError>) {
    let mut seen = HashSet::new();
    for (i, page) in config.pages.iter().enumerate() {
        if !seen.insert(page.id) {
            errors.push(ValidationError::new(
                format!("pages[{i}].id"),
                format!("duplicate page id {}", page.id),
            ));
        }
        if !(page.url_path.starts_with('/') && page.url_path.ends_with('/')) {
            errors.push(ValidationError::new(
                format!("pages[{i}].url_path"),
                format!("'{}' must start and end with '/'", page.url_path),
            ));
        }
        if page.locale.is_empty() {
            errors.push(ValidationError::new(
                format!("pages[{i}].locale"),
                "must not be empty",
            ));
        }
    }
}

fn validate_sites(config: &SiteRouterConfig, errors: &mut Vec<ValidationError>) {
    let page_ids: HashSet<_> = config.pages.iter().map(|p| p.id).collect();
    let mut ids = HashSet::new();
    let mut hosts = HashSet::new();
    let mut defaults = Vec::new();

    for (i, site) in config.sites.iter().enumerate() {
        if !ids.insert(site.id) {
            errors.push(ValidationError::new(
                format!("sites[{i}].id"),
                format!("duplicate site id {}", site.id),
            ));
        }
        if let Err(e) = validate_hostname(&site.hostname) {
            errors.push(ValidationError::new(format!("sites[{i}].hostname"), e.to_string()));
        }
        if site.port == 0 {
            errors.push(ValidationError::new(
                format!("sites[{i}].port"),
                "must be between 1 and 65535",
            ));
        }
        if !hosts.insert((site.hostname.to_lowercase(), site.port)) {
            errors.push(ValidationError::new(
                format!("sites[{i}].hostname"),
                format!("{}:{} is used by more than one site", site.hostname, site.port),
            ));
        }
        if !page_ids.contains(&site.root_page) {
            errors.push(ValidationError::new(
                format!("sites[{i}].root_page"),
                format!("page {} does not exist", site.root_page),
            ));
        }
        if site.is_default_site {
            defaults.push(site.hostname.as_str());
        }
    }

    if defaults.len() > 1 {
        errors.push(ValidationError::new(
            "sites",
            format!(
                "only one site can be the default, found: {}",
                defaults.join(", ")
            ),
        ));
    }
}

fn validate_permissions(config: &SiteRouterConfig, errors: &mut Vec<ValidationError>) {
    let site_ids: HashSet<_> = config.sites.iter().map(|s| s.id).collect();
    let mut group_sites = HashMap::new();
    let mut group_names = HashSet::new();

    for (i, group) in config.groups.iter().enumerate() {
        if group_sites.insert(group.id, group.site_id).is_some() {
            errors.push(ValidationError::new(
                format!("groups[{i}].id"),
                "duplicate group id",
            ));
        }
        if !site_ids.contains(&group.site_id) {
            errors.push(ValidationError::new(
                format!("groups[{i}].site_id"),
                format!("site {} does not exist", group.site_id),
            ));
        }
        if !group_names.insert((group.name.as_str(), group.site_id)) {
            errors.push(ValidationError::new(
                format!("groups[{i}].name"),
                format!("group '{}' already exists on site {}", group.name, group.site_id),
            ));
        }
    }

    let mut members = HashSet::new();
    for (i, user) in config.site_users.iter().enumerate() {
        if !site_ids.contains(&user.site_id) {
            errors.push(ValidationError::new(
                format!("site_users[{i}].site_id"),
                format!("site {} does not exist", user.site_id),
            ));
        }
        if !members.insert((user.site_id, user.user_id)) {
            errors.push(ValidationError::new(
                format!("site_users[{i}]"),
                format!("user {} is listed twice for site {}", user.user_id, user.site_id),
            ));
        }
        for group in &user.groups {
            if group_sites.get(group) != Some(&user.site_id) {
                errors.push(ValidationError::new(
                    format!("site_users[{i}].groups"),
                    format!("group {} does not belong to site {}", group.0, user.site_id),
                ));
            }
        }
    }
}
