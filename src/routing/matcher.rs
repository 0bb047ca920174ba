//! Page path matching against site root paths.
//!
//! # Responsibilities
//! - Find the site whose content root contains a page
//! - Prefer the site serving the current request
//! - Build the public path and URL of the page
//!
//! # Design Decisions
//! - Root paths arrive most specific first, so the first prefix match is the
//!   deepest root
//! - Path matching is case-sensitive
//! - No regex, prefix matching only

use serde::Serialize;

use crate::sites::{SiteId, SiteRootPath};

/// Where a page lives publicly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageUrl {
    pub site_id: SiteId,
    pub root_url: String,
    /// Path of the page relative to its site root, always starting with `/`.
    pub page_path: String,
    pub language_code: String,
}

impl PageUrl {
    pub fn full_url(&self) -> String {
        format!("{}{}", self.root_url, self.page_path)
    }

    /// Path only when the page is on `current`, the full URL otherwise.
    pub fn relative_url(&self, current: Option<SiteId>) -> String {
        if current == Some(self.site_id) {
            self.page_path.clone()
        } else {
            self.full_url()
        }
    }
}

/// Resolve the public location of the page at `url_path`.
///
/// Among all roots containing the page, the first one belonging to `current`
/// wins (with a matching `language` preferred); otherwise the most specific root.
pub fn page_url(
    root_paths: &[SiteRootPath],
    url_path: &str,
    current: Option<SiteId>,
    language: Option<&str>,
) -> Option<PageUrl> {
    let candidates: Vec<&SiteRootPath> = root_paths
        .iter()
        .filter(|rp| url_path.starts_with(&rp.root_path))
        .collect();

    let on_current: Vec<&SiteRootPath> = candidates
        .iter()
        .copied()
        .filter(|rp| Some(rp.site_id) == current)
        .collect();

    let pick = |pool: &[&SiteRootPath]| -> Option<SiteRootPath> {
        language
            .and_then(|lang| pool.iter().find(|rp| rp.language_code == lang))
            .or_else(|| pool.first())
            .map(|rp| (*rp).clone())
    };

    let root = pick(&on_current).or_else(|| pick(&candidates))?;
    let rest = &url_path[root.root_path.len()..];

    Some(PageUrl {
        site_id: root.site_id,
        root_url: root.root_url,
        page_path: format!("/{rest}"),
        language_code: root.language_code,
    })
}
