//! Site subsystem.
//!
//! # Data Flow
//! ```text
//! Request (hostname, port)
//!     → resolver.rs (hostname-or-default query, rank, select)
//!     → Site or NotFound
//!
//! Link generation:
//!     → root_paths.rs (cache hit? return)
//!     → repository (sites joined with root pages, translations)
//!     → cache store (fixed key, TTL)
//!
//! Admin writes:
//!     → manager.rs (validate, default-site rule)
//!     → repository write
//!     → root path cache eviction
//! ```
//!
//! # Design Decisions
//! - Storage is behind `SiteRepository`; `MemoryStore` is the bundled implementation
//! - The cache store is behind `CacheStore`; `MemoryCache` is the bundled implementation
//! - Deterministic: the same site table always yields the same resolution

pub mod cache;
pub mod error;
pub mod manager;
pub mod model;
pub mod repository;
pub mod resolver;
pub mod root_paths;
pub mod store;

pub use cache::{CacheStore, MemoryCache};
pub use error::{SiteError, SiteResult};
pub use manager::SiteManager;
pub use model::{CreateSite, Page, PageId, Site, SiteId, UpdateSite};
pub use repository::SiteRepository;
pub use resolver::{get_site_for_hostname, MatchRank, SiteResolver};
pub use root_paths::{RootPathCache, SiteRootPath, ROOT_PATHS_CACHE_KEY};
pub use store::{MemoryStore, Seed};
