//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the site router.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::permissions::{SiteGroup, SiteMembership};
use crate::sites::{Page, Seed, Site};

/// Root configuration for the site router.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SiteRouterConfig {
    /// Listener configuration (bind address, forwarded headers).
    pub listener: ListenerConfig,

    /// Internationalization settings.
    pub i18n: I18nConfig,

    /// Root path cache settings.
    pub cache: CacheConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    pub admin: AdminConfig,

    /// Site user model as `app_label.ModelName`.
    pub site_user_model: String,

    /// Content pages that sites can be rooted at.
    pub pages: Vec<Page>,

    pub sites: Vec<Site>,

    pub groups: Vec<SiteGroup>,

    pub site_users: Vec<SiteMembership>,
}

impl Default for SiteRouterConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            i18n: I18nConfig::default(),
            cache: CacheConfig::default(),
            timeouts: TimeoutConfig::default(),
            observability: ObservabilityConfig::default(),
            admin: AdminConfig::default(),
            site_user_model: "sites.SiteUser".to_string(),
            pages: Vec::new(),
            sites: Vec::new(),
            groups: Vec::new(),
            site_users: Vec::new(),
        }
    }
}

impl SiteRouterConfig {
    /// Records to load into the site store.
    pub fn seed(&self) -> Seed {
        Seed {
            pages: self.pages.clone(),
            sites: self.sites.clone(),
            groups: self.groups.clone(),
            site_users: self.site_users.clone(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8000").
    pub bind_address: String,

    /// Take the request port from `X-Forwarded-Port` when present.
    /// Enable only behind a proxy that sets the header.
    pub trust_forwarded_port: bool,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
            trust_forwarded_port: false,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct I18nConfig {
    /// Expand each site's root paths into one entry per translation.
    pub enabled: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Lifetime of the cached root path list in seconds.
    pub root_paths_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            root_paths_ttl_secs: 3600,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable the admin API.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,

    /// Admin API bind address.
    pub bind_address: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: String::new(),
            bind_address: "127.0.0.1:8081".to_string(),
        }
    }
}
