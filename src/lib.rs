//! Multi-site routing library.
//!
//! Maps inbound requests to the site configured for their hostname and
//! port, keeps the site root path table cached, and answers site-scoped
//! permission queries.

// Core subsystems
pub mod config;
pub mod http;
pub mod routing;
pub mod sites;

// Access control
pub mod permissions;

// Operations
pub mod admin;
pub mod lifecycle;
pub mod observability;

pub use config::schema::SiteRouterConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
