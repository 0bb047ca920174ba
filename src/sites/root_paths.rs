//! Cached site root paths.
//!
//! # Responsibilities
//! - Compute one `SiteRootPath` per site (per site and locale with i18n)
//! - Keep the list in the cache store under a fixed key with a TTL
//! - Drop the cached list whenever a site changes
//!
//! # Design Decisions
//! - Records are stored as 4-element JSON arrays; anything that does not decode
//!   (including 3-element records without a language code) counts as a miss
//! - Concurrent misses recompute independently; last writer wins

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::observability::metrics;
use crate::sites::cache::CacheStore;
use crate::sites::error::{SiteError, SiteResult};
use crate::sites::model::SiteId;
use crate::sites::repository::SiteRepository;

pub const ROOT_PATHS_CACHE_KEY: &str = "site_root_paths";
pub const DEFAULT_ROOT_PATHS_TTL: Duration = Duration::from_secs(3600);

/// Maps a site's content root to its public base URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RootPathRecord", into = "RootPathRecord")]
pub struct SiteRootPath {
    pub site_id: SiteId,
    /// Internal path of the root page, e.g. `/home/`.
    pub root_path: String,
    /// Scheme and authority, e.g. `https://www.example.com`.
    pub root_url: String,
    pub language_code: String,
}

/// Wire shape of a cached entry.
type RootPathRecord = (SiteId, String, String, String);

impl From<RootPathRecord> for SiteRootPath {
    fn from((site_id, root_path, root_url, language_code): RootPathRecord) -> Self {
        Self {
            site_id,
            root_path,
            root_url,
            language_code,
        }
    }
}

impl From<SiteRootPath> for RootPathRecord {
    fn from(value: SiteRootPath) -> Self {
        (value.site_id, value.root_path, value.root_url, value.language_code)
    }
}

/// Computes and caches the root path list.
#[derive(Clone)]
pub struct RootPathCache {
    repo: Arc<dyn SiteRepository>,
    cache: Arc<dyn CacheStore>,
    ttl: Duration,
    i18n_enabled: bool,
}

impl RootPathCache {
    pub fn new(repo: Arc<dyn SiteRepository>, cache: Arc<dyn CacheStore>) -> Self {
        Self {
            repo,
            cache,
            ttl: DEFAULT_ROOT_PATHS_TTL,
            i18n_enabled: false,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Emit one entry per translation of each site's root page.
    pub fn with_i18n(mut self, enabled: bool) -> Self {
        self.i18n_enabled = enabled;
        self
    }

    /// Root paths, most specific first.
    pub fn get_root_paths(&self) -> SiteResult<Vec<SiteRootPath>> {
        if let Some(value) = self.cache.get(ROOT_PATHS_CACHE_KEY) {
            match serde_json::from_value::<Vec<SiteRootPath>>(value) {
                Ok(paths) => {
                    metrics::record_root_paths_cache("hit");
                    return Ok(paths);
                }
                Err(e) => {
                    tracing::debug!(error = %e, "Discarding cached root paths in an old format");
                    metrics::record_root_paths_cache("stale");
                }
            }
        } else {
            metrics::record_root_paths_cache("miss");
        }

        let paths = self.compute()?;
        let value = serde_json::to_value(&paths).map_err(|e| SiteError::Storage(e.to_string()))?;
        self.cache.set(ROOT_PATHS_CACHE_KEY, value, self.ttl);
        tracing::debug!(entries = paths.len(), "Root paths recomputed");
        Ok(paths)
    }

    /// Evict the cached list. Called after every site write.
    pub fn invalidate(&self) {
        self.cache.delete(ROOT_PATHS_CACHE_KEY);
        metrics::record_root_paths_invalidation();
        tracing::debug!("Root paths cache invalidated");
    }

    fn compute(&self) -> SiteResult<Vec<SiteRootPath>> {
        let mut result = Vec::new();
        for (site, root_page) in self.repo.sites_with_roots()? {
            let root_url = site.root_url();
            if self.i18n_enabled {
                for page in self.repo.translations_of(&root_page)? {
                    result.push(SiteRootPath {
                        site_id: site.id,
                        root_path: page.url_path,
                        root_url: root_url.clone(),
                        language_code: page.locale,
                    });
                }
            } else {
                result.push(SiteRootPath {
                    site_id: site.id,
                    root_path: root_page.url_path,
                    root_url,
                    language_code: root_page.locale,
                });
            }
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sites::cache::MemoryCache;
    use crate::sites::model::{Page, PageId, Site};
    use crate::sites::store::{MemoryStore, Seed};
    use serde_json::json;

    fn page(id: u32, url_path: &str, locale: &str, key: Option<&str>) -> Page {
        Page {
            id: PageId(id),
            url_path: url_path.into(),
            locale: locale.into(),
            translation_key: key.map(Into::into),
        }
    }

    fn site(id: u32, hostname: &str, port: u16, root: u32, is_default: bool) -> Site {
        Site {
            id: SiteId(id),
            hostname: hostname.into(),
            port,
            site_name: String::new(),
            root_page: PageId(root),
            is_default_site: is_default,
        }
    }

    fn fixture() -> (Arc<MemoryStore>, Arc<MemoryCache>) {
        let store = MemoryStore::from_seed(Seed {
            pages: vec![
                page(2, "/home/", "en", Some("home")),
                page(3, "/home-fr/", "fr", Some("home")),
                page(4, "/home/blog/", "en", None),
            ],
            sites: vec![
                site(1, "example.com", 443, 2, true),
                site(2, "blog.example.com", 8000, 4, false),
            ],
            ..Seed::default()
        });
        (Arc::new(store), Arc::new(MemoryCache::new()))
    }

    #[test]
    fn test_root_paths_most_specific_first() {
        let (store, cache) = fixture();
        let paths = RootPathCache::new(store, cache).get_root_paths().unwrap();
        assert_eq!(
            paths,
            vec![
                SiteRootPath {
                    site_id: SiteId(2),
                    root_path: "/home/blog/".into(),
                    root_url: "http://blog.example.com:8000".into(),
                    language_code: "en".into(),
                },
                SiteRootPath {
                    site_id: SiteId(1),
                    root_path: "/home/".into(),
                    root_url: "https://example.com".into(),
                    language_code: "en".into(),
                },
            ]
        );
    }

    #[test]
    fn test_i18n_expands_translations() {
        let (store, cache) = fixture();
        let paths = RootPathCache::new(store, cache)
            .with_i18n(true)
            .get_root_paths()
            .unwrap();
        let entries: Vec<(SiteId, &str, &str)> = paths
            .iter()
            .map(|p| (p.site_id, p.root_path.as_str(), p.language_code.as_str()))
            .collect();
        assert_eq!(
            entries,
            vec![
                (SiteId(2), "/home/blog/", "en"),
                (SiteId(1), "/home/", "en"),
                (SiteId(1), "/home-fr/", "fr"),
            ]
        );
        assert!(paths[1..].iter().all(|p| p.root_url == "https://example.com"));
    }

    #[test]
    fn test_second_call_served_from_cache() {
        let (store, cache) = fixture();
        let root_paths = RootPathCache::new(store.clone(), cache);

        let first = root_paths.get_root_paths().unwrap();
        let queries = store.query_count();
        let second = root_paths.get_root_paths().unwrap();
        assert_eq!(first, second);
        assert_eq!(store.query_count(), queries);

        root_paths.invalidate();
        root_paths.get_root_paths().unwrap();
        assert!(store.query_count() > queries);
    }

    #[test]
    fn test_ttl_expiry_recomputes() {
        let (store, cache) = fixture();
        let root_paths =
            RootPathCache::new(store.clone(), cache).with_ttl(Duration::from_millis(20));

        root_paths.get_root_paths().unwrap();
        let queries = store.query_count();
        std::thread::sleep(Duration::from_millis(40));
        root_paths.get_root_paths().unwrap();
        assert!(store.query_count() > queries);
    }

    #[test]
    fn test_oversized_ttl_still_caches() {
        let (store, cache) = fixture();
        let root_paths =
            RootPathCache::new(store.clone(), cache).with_ttl(Duration::from_secs(u64::MAX));

        let first = root_paths.get_root_paths().unwrap();
        let queries = store.query_count();
        assert_eq!(root_paths.get_root_paths().unwrap(), first);
        assert_eq!(store.query_count(), queries);
    }

    #[test]
    fn test_legacy_cache_shape_is_a_miss() {
        let (store, cache) = fixture();
        cache.set(
            ROOT_PATHS_CACHE_KEY,
            json!([[1, "/home/", "https://example.com"]]),
            Duration::from_secs(60),
        );
        let paths = RootPathCache::new(store, cache.clone()).get_root_paths().unwrap();
        assert_eq!(paths.len(), 2);
        assert_eq!(paths[1].language_code, "en");

        // the recomputed list replaced the legacy value
        let cached = cache.get(ROOT_PATHS_CACHE_KEY).unwrap();
        assert_eq!(cached[0], json!([2, "/home/blog/", "http://blog.example.com:8000", "en"]));
    }
}
