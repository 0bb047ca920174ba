//! Validated site writes.
//!
//! # Responsibilities
//! - Check submitted site fields before they reach the repository
//! - Keep at most one default site
//! - Evict cached root paths after every write
//!
//! # Design Decisions
//! - "At most one default" is checked here for early errors and again by the
//!   store under its write lock, which is what concurrent writers race on
//! - Several defaults already in storage is a fatal error, never auto-repaired

use std::sync::Arc;

use crate::sites::error::{SiteError, SiteResult};
use crate::sites::model::{CreateSite, Site, SiteId, UpdateSite};
use crate::sites::repository::SiteRepository;
use crate::sites::root_paths::RootPathCache;

/// Front door for creating, changing and deleting sites.
#[derive(Clone)]
pub struct SiteManager {
    repo: Arc<dyn SiteRepository>,
    root_paths: RootPathCache,
}

impl SiteManager {
    pub fn new(repo: Arc<dyn SiteRepository>, root_paths: RootPathCache) -> Self {
        Self { repo, root_paths }
    }

    pub fn root_paths(&self) -> &RootPathCache {
        &self.root_paths
    }

    pub fn list(&self) -> SiteResult<Vec<Site>> {
        self.repo.list_sites()
    }

    pub fn get(&self, id: SiteId) -> SiteResult<Site> {
        self.repo.get_site(id)
    }

    pub fn create(&self, input: CreateSite) -> SiteResult<Site> {
        let candidate = Site {
            id: SiteId(0),
            hostname: input.hostname.clone(),
            port: input.port,
            site_name: input.site_name.clone(),
            root_page: input.root_page,
            is_default_site: input.is_default_site,
        };
        self.clean(&candidate, None)?;

        let site = self.repo.insert_site(input)?;
        self.root_paths.invalidate();
        tracing::info!(site_id = %site.id, site = %site, "Site created");
        Ok(site)
    }

    pub fn update(&self, id: SiteId, changes: UpdateSite) -> SiteResult<Site> {
        let current = self.repo.get_site(id)?;
        let candidate = changes.apply_to(&current);
        self.clean(&candidate, Some(id))?;

        let site = self.repo.save_site(candidate)?;
        self.root_paths.invalidate();
        tracing::info!(site_id = %site.id, site = %site, "Site updated");
        Ok(site)
    }

    pub fn delete(&self, id: SiteId) -> SiteResult<()> {
        self.repo.delete_site(id)?;
        self.root_paths.invalidate();
        tracing::info!(site_id = %id, "Site deleted");
        Ok(())
    }

    /// Field validation for a site about to be written. `id` is the site being
    /// updated, if any.
    pub fn clean(&self, site: &Site, id: Option<SiteId>) -> SiteResult<()> {
        validate_hostname(&site.hostname)?;
        if site.port == 0 {
            return Err(SiteError::Invalid {
                field: "port",
                message: "port must be between 1 and 65535".into(),
            });
        }
        self.repo.get_page(site.root_page)?;

        if let Some(existing) = self.repo.find_by_host(&site.hostname, site.port)? {
            if Some(existing.id) != id {
                return Err(SiteError::DuplicateHost {
                    hostname: site.hostname.clone(),
                    port: site.port,
                });
            }
        }

        // Runs even for non-default writes so corrupt storage is reported.
        let default = self.repo.default_site()?;
        if let Some(default) = default {
            if site.is_default_site && Some(default.id) != id {
                return Err(SiteError::DefaultConflict {
                    hostname: default.hostname,
                });
            }
        }
        Ok(())
    }
}

/// Hostnames must be a bare host: a domain, IPv4 address or bracketed IPv6 address.
pub fn validate_hostname(hostname: &str) -> SiteResult<()> {
    if hostname.is_empty() {
        return Err(SiteError::Invalid {
            field: "hostname",
            message: "hostname must not be empty".into(),
        });
    }
    if hostname.contains(['/', ':']) && !hostname.starts_with('[') {
        return Err(SiteError::Invalid {
            field: "hostname",
            message: format!("'{hostname}' is not a bare hostname"),
        });
    }
    url::Host::parse(hostname)
        .map(|_| ())
        .map_err(|e| SiteError::Invalid {
            field: "hostname",
            message: format!("'{hostname}': {e}"),
        })
}
