//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Internal page path (e.g. /home/blog/post/)
//!     → root paths (most specific first, from the root path cache)
//!     → matcher.rs (prefix match, current site preferred)
//!     → Return: PageUrl or None when no site contains the page
//! ```
//!
//! # Design Decisions
//! - Deterministic: same root paths and path always give the same URL
//! - First match wins (roots are already ordered by specificity)

pub mod matcher;

pub use matcher::{page_url, PageUrl};
