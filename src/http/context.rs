//! Request-scoped site context.
//!
//! The site for a request is resolved at most once; the result (including
//! "no site") is kept in the request extensions for the rest of the request.

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::http::request::{request_host, request_id};
use crate::http::server::AppState;
use crate::sites::{Site, SiteResolver, SiteResult};

/// The site responsible for the current request, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentSite(pub Option<Site>);

impl CurrentSite {
    pub fn site(&self) -> Option<&Site> {
        self.0.as_ref()
    }
}

/// Find the site for `req`, reusing an earlier result for the same request.
///
/// `listener_port` is the port the request was accepted on.
pub fn find_for_request<B>(
    resolver: &SiteResolver,
    req: &mut Request<B>,
    trust_forwarded_port: bool,
    listener_port: u16,
) -> SiteResult<Option<Site>> {
    if let Some(current) = req.extensions().get::<CurrentSite>() {
        return Ok(current.0.clone());
    }

    let site = match request_host(req.headers(), req.uri(), trust_forwarded_port, listener_port) {
        Some(host) => resolver.find(&host.hostname, host.port)?,
        None => None,
    };
    req.extensions_mut().insert(CurrentSite(site.clone()));
    Ok(site)
}

/// Middleware attaching `CurrentSite` to every request.
pub async fn site_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let services = state.services();
    let trust = services.config.listener.trust_forwarded_port;

    match find_for_request(&services.resolver, &mut req, trust, state.listener_port()) {
        Ok(site) => {
            tracing::debug!(
                request_id = %request_id(req.headers()),
                site = ?site.as_ref().map(|s| s.id),
                "Request site attached"
            );
            next.run(req).await
        }
        Err(e) => {
            tracing::error!(request_id = %request_id(req.headers()), error = %e, "Site resolution failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Site configuration error").into_response()
        }
    }
}
