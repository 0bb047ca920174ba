//! In-memory site store.
//!
//! # Responsibilities
//! - Hold sites, pages, groups and site users
//! - Serve lock-free reads from an immutable snapshot
//! - Serialize writers and publish a new snapshot per write
//!
//! # Design Decisions
//! - Snapshots are swapped atomically (arc-swap), so a reader never sees a half-applied write
//! - Every read query bumps a counter so callers can observe caching

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use arc_swap::ArcSwap;

use crate::permissions::{
    GroupId, GroupRepository, PermissionResult, SiteGroup, SiteMembership, UserId,
};
use crate::sites::error::{SiteError, SiteResult};
use crate::sites::model::{CreateSite, Page, PageId, Site, SiteId};
use crate::sites::repository::SiteRepository;

/// Records loaded into a store in one go.
#[derive(Debug, Clone, Default)]
pub struct Seed {
    pub pages: Vec<Page>,
    pub sites: Vec<Site>,
    pub groups: Vec<SiteGroup>,
    pub site_users: Vec<SiteMembership>,
}

#[derive(Debug, Clone, Default)]
struct Tables {
    sites: BTreeMap<SiteId, Site>,
    pages: BTreeMap<PageId, Page>,
    groups: BTreeMap<GroupId, SiteGroup>,
    site_users: Vec<SiteMembership>,
}

impl Tables {
    fn from_seed(seed: Seed) -> Self {
        Self {
            sites: seed.sites.into_iter().map(|s| (s.id, s)).collect(),
            pages: seed.pages.into_iter().map(|p| (p.id, p)).collect(),
            groups: seed.groups.into_iter().map(|g| (g.id, g)).collect(),
            site_users: seed.site_users,
        }
    }

    fn host_taken(&self, hostname: &str, port: u16, except: Option<SiteId>) -> bool {
        self.sites
            .values()
            .any(|s| Some(s.id) != except && s.port == port && s.matches_hostname(hostname))
    }

    /// Refuse a default site `id` while another site holds the flag.
    fn check_default(&self, id: Option<SiteId>) -> SiteResult<()> {
        let defaults: Vec<&Site> = self.sites.values().filter(|s| s.is_default_site).collect();
        match defaults.as_slice() {
            [] => Ok(()),
            [site] if Some(site.id) == id => Ok(()),
            [site] => Err(SiteError::DefaultConflict {
                hostname: site.hostname.clone(),
            }),
            many => Err(SiteError::MultipleDefaults { count: many.len() }),
        }
    }

    fn next_site_id(&self) -> SiteResult<SiteId> {
        match self.sites.keys().next_back() {
            None => Ok(SiteId(1)),
            Some(last) => last
                .0
                .checked_add(1)
                .map(SiteId)
                .ok_or_else(|| SiteError::Storage("site id space exhausted".into())),
        }
    }
}

/// Thread-safe in-memory implementation of the site repositories.
pub struct MemoryStore {
    tables: ArcSwap<Tables>,
    write_lock: Mutex<()>,
    queries: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::from_seed(Seed::default())
    }

    pub fn from_seed(seed: Seed) -> Self {
        Self {
            tables: ArcSwap::from_pointee(Tables::from_seed(seed)),
            write_lock: Mutex::new(()),
            queries: AtomicUsize::new(0),
        }
    }

    /// Replace every record with `seed`.
    pub fn reseed(&self, seed: Seed) {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.tables.store(Arc::new(Tables::from_seed(seed)));
        tracing::info!("Site store reseeded");
    }

    /// Number of read queries served so far.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::Relaxed)
    }

    pub fn insert_page(&self, page: Page) -> SiteResult<()> {
        self.write(|t| {
            t.pages.insert(page.id, page);
            Ok(())
        })
    }

    pub fn insert_group(&self, group: SiteGroup) -> SiteResult<()> {
        self.write(|t| {
            if !t.sites.contains_key(&group.site_id) {
                return Err(SiteError::UnknownSite(group.site_id));
            }
            if t
                .groups
                .values()
                .any(|g| g.id != group.id && g.site_id == group.site_id && g.name == group.name)
            {
                return Err(SiteError::Invalid {
                    field: "name",
                    message: format!("group '{}' already exists on site {}", group.name, group.site_id),
                });
            }
            t.groups.insert(group.id, group);
            Ok(())
        })
    }

    /// Insert or replace the membership of `user.user_id` on `user.site_id`.
    pub fn upsert_site_user(&self, user: SiteMembership) -> SiteResult<()> {
        self.write(|t| {
            if !t.sites.contains_key(&user.site_id) {
                return Err(SiteError::UnknownSite(user.site_id));
            }
            t.site_users
                .retain(|u| !(u.site_id == user.site_id && u.user_id == user.user_id));
            t.site_users.push(user);
            Ok(())
        })
    }

    pub fn site_user(&self, site_id: SiteId, user_id: UserId) -> Option<SiteMembership> {
        self.read()
            .site_users
            .iter()
            .find(|u| u.site_id == site_id && u.user_id == user_id)
            .cloned()
    }

    pub fn groups_for_site(&self, site_id: SiteId) -> Vec<SiteGroup> {
        self.read()
            .groups
            .values()
            .filter(|g| g.site_id == site_id)
            .cloned()
            .collect()
    }

    fn read(&self) -> Arc<Tables> {
        self.queries.fetch_add(1, Ordering::Relaxed);
        self.tables.load_full()
    }

    fn write<T>(&self, f: impl FnOnce(&mut Tables) -> SiteResult<T>) -> SiteResult<T> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut next = Tables::clone(&self.tables.load());
        let out = f(&mut next)?;
        self.tables.store(Arc::new(next));
        Ok(out)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SiteRepository for MemoryStore {
    fn list_sites(&self) -> SiteResult<Vec<Site>> {
        let mut sites: Vec<Site> = self.read().sites.values().cloned().collect();
        sites.sort_by_cached_key(|s| s.hostname.to_lowercase());
        Ok(sites)
    }

    fn get_site(&self, id: SiteId) -> SiteResult<Site> {
        self.read()
            .sites
            .get(&id)
            .cloned()
            .ok_or(SiteError::UnknownSite(id))
    }

    fn find_by_host(&self, hostname: &str, port: u16) -> SiteResult<Option<Site>> {
        Ok(self
            .read()
            .sites
            .values()
            .find(|s| s.port == port && s.matches_hostname(hostname))
            .cloned())
    }

    fn hostname_or_default(&self, hostname: &str) -> SiteResult<Vec<Site>> {
        Ok(self
            .read()
            .sites
            .values()
            .filter(|s| s.is_default_site || s.matches_hostname(hostname))
            .cloned()
            .collect())
    }

    fn default_site(&self) -> SiteResult<Option<Site>> {
        let tables = self.read();
        let defaults: Vec<&Site> = tables.sites.values().filter(|s| s.is_default_site).collect();
        match defaults.as_slice() {
            [] => Ok(None),
            [site] => Ok(Some((*site).clone())),
            many => Err(SiteError::MultipleDefaults { count: many.len() }),
        }
    }

    fn sites_with_roots(&self) -> SiteResult<Vec<(Site, Page)>> {
        let tables = self.read();
        let mut rows = Vec::with_capacity(tables.sites.len());
        for site in tables.sites.values() {
            let page = tables
                .pages
                .get(&site.root_page)
                .cloned()
                .ok_or(SiteError::UnknownPage(site.root_page))?;
            rows.push((site.clone(), page));
        }
        rows.sort_by(|(a, pa), (b, pb)| {
            pb.url_path
                .cmp(&pa.url_path)
                .then(b.is_default_site.cmp(&a.is_default_site))
                .then_with(|| a.hostname.cmp(&b.hostname))
        });
        Ok(rows)
    }

    fn get_page(&self, id: PageId) -> SiteResult<Page> {
        self.read()
            .pages
            .get(&id)
            .cloned()
            .ok_or(SiteError::UnknownPage(id))
    }

    fn translations_of(&self, page: &Page) -> SiteResult<Vec<Page>> {
        Ok(self
            .read()
            .pages
            .values()
            .filter(|p| p.is_translation_of(page))
            .cloned()
            .collect())
    }

    fn insert_site(&self, input: CreateSite) -> SiteResult<Site> {
        self.write(|t| {
            if t.host_taken(&input.hostname, input.port, None) {
                return Err(SiteError::DuplicateHost {
                    hostname: input.hostname,
                    port: input.port,
                });
            }
            if input.is_default_site {
                t.check_default(None)?;
            }
            let site = Site {
                id: t.next_site_id()?,
                hostname: input.hostname,
                port: input.port,
                site_name: input.site_name,
                root_page: input.root_page,
                is_default_site: input.is_default_site,
            };
            t.sites.insert(site.id, site.clone());
            Ok(site)
        })
    }

    fn save_site(&self, site: Site) -> SiteResult<Site> {
        self.write(|t| {
            if !t.sites.contains_key(&site.id) {
                return Err(SiteError::UnknownSite(site.id));
            }
            if t.host_taken(&site.hostname, site.port, Some(site.id)) {
                return Err(SiteError::DuplicateHost {
                    hostname: site.hostname,
                    port: site.port,
                });
            }
            if site.is_default_site {
                t.check_default(Some(site.id))?;
            }
            t.sites.insert(site.id, site.clone());
            Ok(site)
        })
    }

    fn delete_site(&self, id: SiteId) -> SiteResult<()> {
        self.write(|t| {
            if t.sites.remove(&id).is_none() {
                return Err(SiteError::UnknownSite(id));
            }
            t.groups.retain(|_, g| g.site_id != id);
            t.site_users.retain(|u| u.site_id != id);
            Ok(())
        })
    }
}

impl GroupRepository for MemoryStore {
    fn groups(&self, site_id: SiteId, ids: &[GroupId]) -> PermissionResult<Vec<SiteGroup>> {
        let tables = self.read();
        Ok(ids
            .iter()
            .filter_map(|id| tables.groups.get(id))
            .filter(|g| g.site_id == site_id)
            .cloned()
            .collect())
    }
}
