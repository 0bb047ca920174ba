//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, trace, timeout)
//!     → request.rs (Host header → hostname and effective port)
//!     → context.rs (resolve the site once, store it on the request)
//!     → handlers (site description, page URL translation)
//!     → Send to client
//! ```

pub mod context;
pub mod request;
pub mod server;

pub use context::{find_for_request, CurrentSite};
pub use request::{request_host, RequestHost, X_REQUEST_ID};
pub use server::{AppState, HttpServer, Services};
