//! Repository trait for site data access.
//!
//! Implementations must keep `(hostname, port)` unique. The "at most one
//! default" rule is enforced by `SiteManager` before writes reach here.

use crate::sites::error::SiteResult;
use crate::sites::model::{CreateSite, Page, PageId, Site, SiteId};

pub trait SiteRepository: Send + Sync {
    /// All sites, ordered by lowercase hostname.
    fn list_sites(&self) -> SiteResult<Vec<Site>>;

    fn get_site(&self, id: SiteId) -> SiteResult<Site>;

    fn find_by_host(&self, hostname: &str, port: u16) -> SiteResult<Option<Site>>;

    /// Sites whose hostname equals `hostname` or which are flagged default.
    fn hostname_or_default(&self, hostname: &str) -> SiteResult<Vec<Site>>;

    /// The default site. More than one default is `SiteError::MultipleDefaults`.
    fn default_site(&self) -> SiteResult<Option<Site>>;

    /// Sites joined with their root page, ordered by
    /// (root url_path desc, is_default desc, hostname asc).
    fn sites_with_roots(&self) -> SiteResult<Vec<(Site, Page)>>;

    fn get_page(&self, id: PageId) -> SiteResult<Page>;

    /// Every translation of `page`, including `page` itself.
    fn translations_of(&self, page: &Page) -> SiteResult<Vec<Page>>;

    fn insert_site(&self, input: CreateSite) -> SiteResult<Site>;

    fn save_site(&self, site: Site) -> SiteResult<Site>;

    /// Delete a site together with its groups and site users.
    fn delete_site(&self, id: SiteId) -> SiteResult<()>;
}
