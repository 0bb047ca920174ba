//! Site and page records.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Surrogate identifier of a site record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiteId(pub u32);

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a content page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(pub u32);

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub const DEFAULT_PORT: u16 = 80;

/// A content node that can serve as the root of a site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub id: PageId,
    /// Internal path of the page, e.g. `/home/`.
    pub url_path: String,
    /// Language code of the page's locale.
    pub locale: String,
    /// Pages sharing a key are translations of one another.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation_key: Option<String>,
}

impl Page {
    /// Whether `other` is a translation of this page (a page is its own translation).
    pub fn is_translation_of(&self, other: &Page) -> bool {
        if self.id == other.id {
            return true;
        }
        match (&self.translation_key, &other.translation_key) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

/// A hosted site: a hostname/port pair bound to a content root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    pub id: SiteId,
    pub hostname: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Human-readable name, may be empty.
    #[serde(default)]
    pub site_name: String,
    pub root_page: PageId,
    /// Catches requests for any hostname lacking its own site.
    #[serde(default)]
    pub is_default_site: bool,
}

impl Site {
    /// Scheme and authority of the site, inferred from well-known ports.
    pub fn root_url(&self) -> String {
        match self.port {
            80 => format!("http://{}", self.hostname),
            443 => format!("https://{}", self.hostname),
            port => format!("http://{}:{}", self.hostname, port),
        }
    }

    pub fn matches_hostname(&self, hostname: &str) -> bool {
        self.hostname.eq_ignore_ascii_case(hostname)
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.site_name.is_empty() {
            f.write_str(&self.hostname)?;
            if self.port != DEFAULT_PORT {
                write!(f, ":{}", self.port)?;
            }
        } else {
            f.write_str(&self.site_name)?;
        }
        if self.is_default_site {
            f.write_str(" [default]")?;
        }
        Ok(())
    }
}

/// Fields required to create a site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSite {
    pub hostname: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub site_name: String,
    pub root_page: PageId,
    #[serde(default)]
    pub is_default_site: bool,
}

/// Fields that can be changed on an existing site.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateSite {
    pub hostname: Option<String>,
    pub port: Option<u16>,
    pub site_name: Option<String>,
    pub root_page: Option<PageId>,
    pub is_default_site: Option<bool>,
}

impl UpdateSite {
    /// Apply the changed fields on top of `site`.
    pub fn apply_to(&self, site: &Site) -> Site {
        Site {
            id: site.id,
            hostname: self.hostname.clone().unwrap_or_else(|| site.hostname.clone()),
            port: self.port.unwrap_or(site.port),
            site_name: self.site_name.clone().unwrap_or_else(|| site.site_name.clone()),
            root_page: self.root_page.unwrap_or(site.root_page),
            is_default_site: self.is_default_site.unwrap_or(site.is_default_site),
        }
    }
}

pub fn default_port() -> u16 {
    DEFAULT_PORT
}
