//! Hostname/port to site resolution.
//!
//! # Responsibilities
//! - Fetch candidate sites (hostname match or default) in one query
//! - Rank candidates by match quality
//! - Pick exactly one site or report NotFound
//!
//! # Design Decisions
//! - Ranking happens in memory, independent of the storage engine
//! - Hostnames compare case-insensitively
//! - NotFound is an error value here; request-level callers turn it into "no site"

use std::sync::Arc;

use crate::observability::metrics;
use crate::sites::error::{SiteError, SiteResult};
use crate::sites::model::Site;
use crate::sites::repository::SiteRepository;

/// Match quality of a candidate site, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MatchRank {
    /// Hostname and port both match.
    HostnamePort,
    /// Hostname matches and the site is the default.
    HostnameDefault,
    /// Default site with a different hostname.
    Default,
    /// Hostname matches, port does not, not the default.
    Hostname,
}

impl MatchRank {
    /// Rank a site returned by the hostname-or-default query.
    pub fn of(site: &Site, hostname: &str, port: u16) -> Self {
        let hostname_matches = site.matches_hostname(hostname);
        if hostname_matches && site.port == port {
            MatchRank::HostnamePort
        } else if hostname_matches && site.is_default_site {
            MatchRank::HostnameDefault
        } else if site.is_default_site {
            MatchRank::Default
        } else {
            MatchRank::Hostname
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchRank::HostnamePort => "hostname_port",
            MatchRank::HostnameDefault => "hostname_default",
            MatchRank::Default => "default",
            MatchRank::Hostname => "hostname",
        }
    }
}

/// Pick the responsible site out of ranked candidates.
///
/// A default-by-exclusion winner gives way to a hostname-only match when that
/// match is the single other candidate.
fn select(mut ranked: Vec<(MatchRank, Site)>) -> Option<(MatchRank, Site)> {
    ranked.sort_by_key(|(rank, _)| *rank);
    let best = ranked.first()?.0;

    if ranked.len() == 1 || matches!(best, MatchRank::HostnamePort | MatchRank::HostnameDefault) {
        return ranked.into_iter().next();
    }
    if best == MatchRank::Default {
        let index = usize::from(ranked.len() == 2);
        return ranked.into_iter().nth(index);
    }
    None
}

/// Return the site responsible for `hostname` and `port`.
pub fn get_site_for_hostname(
    repo: &dyn SiteRepository,
    hostname: &str,
    port: u16,
) -> SiteResult<Site> {
    let ranked = repo
        .hostname_or_default(hostname)?
        .into_iter()
        .map(|site| (MatchRank::of(&site, hostname, port), site))
        .collect();

    match select(ranked) {
        Some((rank, site)) => {
            tracing::debug!(hostname, port, site_id = %site.id, rank = rank.as_str(), "Site resolved");
            metrics::record_resolution(rank.as_str());
            Ok(site)
        }
        None => {
            tracing::debug!(hostname, port, "No site matched");
            metrics::record_resolution("none");
            Err(SiteError::NotFound {
                hostname: hostname.to_string(),
                port,
            })
        }
    }
}

/// Shared handle for resolving sites against one repository.
#[derive(Clone)]
pub struct SiteResolver {
    repo: Arc<dyn SiteRepository>,
}

impl SiteResolver {
    pub fn new(repo: Arc<dyn SiteRepository>) -> Self {
        Self { repo }
    }

    pub fn resolve(&self, hostname: &str, port: u16) -> SiteResult<Site> {
        get_site_for_hostname(self.repo.as_ref(), hostname, port)
    }

    /// Like `resolve`, but NotFound becomes `None`. Other errors propagate.
    pub fn find(&self, hostname: &str, port: u16) -> SiteResult<Option<Site>> {
        match self.resolve(hostname, port) {
            Ok(site) => Ok(Some(site)),
            Err(SiteError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
