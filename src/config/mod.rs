//! Site router configuration.
//!
//! # Data Flow
//! ```text
//! site-router.toml
//!     → loader.rs (read, toml → SiteRouterConfig)
//!     → validation.rs (every semantic error collected, site user model checked)
//!     → seed for the site store + settings for the services
//!
//! On file change:
//!     watcher.rs reloads and validates
//!     → valid config sent to the server, invalid one logged and dropped
//!     → server swaps services, reseeds the store, evicts root paths
//! ```
//!
//! # Design Decisions
//! - A loaded config is never mutated; a reload replaces it whole
//! - Every section has defaults, so a file with only sites is enough
//! - Serde handles shape, validation.rs handles meaning

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    AdminConfig, CacheConfig, I18nConfig, ListenerConfig, ObservabilityConfig, SiteRouterConfig,
    TimeoutConfig,
};
pub use validation::ValidationError;
