//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with all handlers
//! - Wire up middleware (site resolution, tracing, timeout, request ID)
//! - Hold the hot-swappable service set
//! - Apply configuration reloads
//! - Bind server to listener and shut down gracefully

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use axum::{
    extract::{Query, State},
    http::{StatusCode, Uri},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Extension, Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::SiteRouterConfig;
use crate::http::context::{site_middleware, CurrentSite};
use crate::http::request::DEFAULT_REQUEST_PORT;
use crate::permissions::{Authorizer, ModelPolicy};
use crate::routing::page_url;
use crate::sites::{MemoryCache, MemoryStore, RootPathCache, SiteManager, SiteRepository, SiteResolver};

/// Everything derived from one configuration version.
pub struct Services {
    pub config: SiteRouterConfig,
    pub resolver: SiteResolver,
    pub sites: SiteManager,
    pub authorizer: Authorizer,
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub inner: Arc<ArcSwap<Services>>,
    pub store: Arc<MemoryStore>,
    pub cache: Arc<MemoryCache>,
    listener_port: Arc<AtomicU16>,
}

impl AppState {
    pub fn new(config: SiteRouterConfig) -> Self {
        let store = Arc::new(MemoryStore::from_seed(config.seed()));
        let cache = Arc::new(MemoryCache::default());
        let listener_port = config
            .listener
            .bind_address
            .parse::<SocketAddr>()
            .map_or(DEFAULT_REQUEST_PORT, |addr| addr.port());
        let services = build_services(config, &store, &cache);
        Self {
            inner: Arc::new(ArcSwap::from_pointee(services)),
            store,
            cache,
            listener_port: Arc::new(AtomicU16::new(listener_port)),
        }
    }

    /// Local port requests are accepted on.
    pub fn listener_port(&self) -> u16 {
        self.listener_port.load(Ordering::Relaxed)
    }

    pub fn set_listener_port(&self, port: u16) {
        self.listener_port.store(port, Ordering::Relaxed);
    }

    /// Current service set.
    pub fn services(&self) -> Arc<Services> {
        self.inner.load_full()
    }

    /// Swap in a new configuration: reseed the store and drop cached root paths.
    pub fn reload(&self, config: SiteRouterConfig) {
        self.store.reseed(config.seed());
        let services = build_services(config, &self.store, &self.cache);
        services.sites.root_paths().invalidate();
        self.inner.store(Arc::new(services));
        tracing::info!("Configuration reloaded");
    }
}

fn build_services(config: SiteRouterConfig, store: &Arc<MemoryStore>, cache: &Arc<MemoryCache>) -> Services {
    let repo: Arc<dyn SiteRepository> = store.clone();
    let root_paths = RootPathCache::new(repo.clone(), cache.clone())
        .with_ttl(Duration::from_secs(config.cache.root_paths_ttl_secs))
        .with_i18n(config.i18n.enabled);

    Services {
        resolver: SiteResolver::new(repo.clone()),
        sites: SiteManager::new(repo, root_paths),
        authorizer: Authorizer::default().with_policy(Arc::new(ModelPolicy::new(store.clone()))),
        config,
    }
}

/// HTTP server for the site router.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    pub fn new(config: SiteRouterConfig) -> Self {
        let state = AppState::new(config);
        let router = Self::build_router(state.clone());
        Self { router, state }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(state: AppState) -> Router {
        let request_secs = state.services().config.timeouts.request_secs;

        Router::new()
            .route("/_site/url", get(page_url_handler))
            .route("/", get(site_handler))
            .route("/{*path}", get(site_handler))
            .layer(middleware::from_fn_with_state(state.clone(), site_middleware))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(request_secs)))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    /// Serve until `shutdown` fires, applying every config received on `config_updates`.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<SiteRouterConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        self.state.set_listener_port(addr.port());
        tracing::info!(address = %addr, "HTTP server starting");

        let state = self.state.clone();
        tokio::spawn(async move {
            while let Some(config) = config_updates.recv().await {
                state.reload(config);
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Describe the site serving this request.
async fn site_handler(Extension(current): Extension<CurrentSite>, uri: Uri) -> Json<serde_json::Value> {
    Json(json!({
        "site": current.site(),
        "root_url": current.site().map(|s| s.root_url()),
        "path": uri.path(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct PageUrlQuery {
    pub path: String,
    pub lang: Option<String>,
}

/// Translate an internal page path into its public URL.
async fn page_url_handler(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentSite>,
    Query(query): Query<PageUrlQuery>,
) -> Response {
    let services = state.services();
    let root_paths = match services.sites.root_paths().get_root_paths() {
        Ok(paths) => paths,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load site root paths");
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": e.to_string() })))
                .into_response();
        }
    };

    let current_id = current.site().map(|s| s.id);
    match page_url(&root_paths, &query.path, current_id, query.lang.as_deref()) {
        Some(found) => Json(json!({
            "site_id": found.site_id,
            "root_url": found.root_url,
            "page_path": found.page_path,
            "language_code": found.language_code,
            "url": found.relative_url(current_id),
        }))
        .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("No site contains page '{}'", query.path) })),
        )
            .into_response(),
    }
}
