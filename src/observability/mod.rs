//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! resolver / root path cache / admin writes produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters via the metrics facade)
//!
//! Consumers:
//!     → stdout
//!     → Prometheus scrape endpoint
//! ```

pub mod logging;
pub mod metrics;
