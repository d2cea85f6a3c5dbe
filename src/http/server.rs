//! HTTP server setup and the per-request pipeline.
//!
//! # Responsibilities
//! - Create Axum Router with the gateway handler
//! - Wire up middleware (tracing, timeout, request ID)
//! - Apply configuration reloads between requests
//! - Classify, fetch, verify, redact, decide caching, respond
//!
//! # Request Pipeline
//! ```text
//! method check → config check → allowlist
//!     → cache lookup (cache-candidate endpoints only)
//!     → upstream GET → JSON decode → trip verification → redaction
//!     → upstream status check → cache policy → cache store → respond
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::State,
    http::{HeaderValue, Method, Request, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use chrono::Utc;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::caching::{self, CacheKey, Freshness, MemoryCache, ResponseCache};
use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::http::request::{
    propagate_request_id_layer, request_id, request_id_str, set_request_id_layer,
};
use crate::http::response::{json_success, render, CacheStatus};
use crate::lifecycle::shutdown;
use crate::observability::metrics;
use crate::privacy::redact_payload;
use crate::routing::{Allowlist, Classification, Route};
use crate::trip::{verify_trip, TripPayload};
use crate::upstream::{BackendFetcher, FetchLimits};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ArcSwap<GatewayConfig>>,
    pub allowlist: Arc<Allowlist>,
    pub fetcher: BackendFetcher,
    pub cache: Arc<dyn ResponseCache>,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    state: AppState,
    persistent_cache: Option<MemoryCache>,
}

impl HttpServer {
    /// Create a new HTTP server, building the cache from configuration.
    pub fn new(config: GatewayConfig) -> Self {
        let (cache, persistent_cache) = caching::from_config(&config.cache);
        let mut server = Self::with_cache(config, cache);
        server.persistent_cache = persistent_cache;
        server
    }

    /// Create a new HTTP server backed by the given cache.
    pub fn with_cache(config: GatewayConfig, cache: Arc<dyn ResponseCache>) -> Self {
        let request_timeout = Duration::from_secs(config.timeouts.request_secs);
        let state = AppState {
            config: Arc::new(ArcSwap::from_pointee(config)),
            allowlist: Arc::new(Allowlist::standard()),
            fetcher: BackendFetcher::new(),
            cache,
        };

        let router = Self::build_router(request_timeout, state.clone());
        Self {
            router,
            state,
            persistent_cache: None,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(request_timeout: Duration, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(gateway_handler))
            .route("/", any(gateway_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(request_timeout))
            .layer(TraceLayer::new_for_http())
            .layer(propagate_request_id_layer())
            .layer(set_request_id_layer())
    }

    /// The router, for driving the gateway without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// The currently active configuration.
    pub fn config(&self) -> Arc<GatewayConfig> {
        self.state.config.load_full()
    }

    /// Run the server until `shutdown_rx` fires, then persist the cache.
    ///
    /// Configurations arriving on `config_updates` replace the active one for
    /// subsequent requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<GatewayConfig>,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let live_config = self.state.config.clone();
        tokio::spawn(async move {
            while let Some(new_config) = config_updates.recv().await {
                let current = live_config.load();
                if current.listener.bind_address != new_config.listener.bind_address {
                    tracing::warn!(
                        bind_address = %new_config.listener.bind_address,
                        "Listener address changes require a restart; ignoring"
                    );
                }
                if current.timeouts.request_secs != new_config.timeouts.request_secs
                    || current.cache != new_config.cache
                {
                    tracing::warn!("Request timeout and cache changes require a restart");
                }
                tracing::info!(
                    backend = %new_config.upstream.base_url,
                    upstream_timeout_secs = new_config.timeouts.upstream_secs,
                    "Configuration reloaded"
                );
                live_config.store(Arc::new(new_config));
            }
        });

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown::signalled(shutdown_rx))
            .await?;

        shutdown::finish(self.persistent_cache.as_ref());

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Main gateway handler.
async fn gateway_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let method = request.method().clone();
    let uri = request.uri().clone();
    let request_id = request_id(request.headers()).cloned();
    let rid = request_id_str(request.headers()).to_string();

    let classification = state.allowlist.classify(&method, uri.path());
    let endpoint = match &classification {
        Classification::Allowed(route) => route.endpoint.label(),
        Classification::Denied => "denied",
        Classification::MethodNotAllowed => "none",
    };

    tracing::debug!(
        request_id = %rid,
        method = %method,
        path = %uri.path(),
        classification = ?classification,
        "Handling request"
    );

    let response = match serve(&state, classification, &method, &uri, request_id.as_ref()).await {
        Ok(response) => response,
        Err(e) => {
            match e.status() {
                s if s.is_server_error() => {
                    tracing::error!(request_id = %rid, path = %uri.path(), error = %e, kind = e.kind(), "Request failed")
                }
                _ => {
                    tracing::warn!(request_id = %rid, path = %uri.path(), error = %e, kind = e.kind(), "Request rejected")
                }
            }
            e.into_response()
        }
    };

    let status = response.status();
    metrics::record_request(method.as_str(), status.as_u16(), endpoint, start_time);
    tracing::info!(
        request_id = %rid,
        method = %method,
        path = %uri.path(),
        endpoint,
        status = status.as_u16(),
        latency_ms = start_time.elapsed().as_millis() as u64,
        "Request completed"
    );

    response
}

async fn serve(
    state: &AppState,
    classification: Classification,
    method: &Method,
    uri: &Uri,
    request_id: Option<&HeaderValue>,
) -> Result<Response, GatewayError> {
    if classification == Classification::MethodNotAllowed {
        return Err(GatewayError::MethodNotAllowed);
    }

    let config = state.config.load_full();
    if config.upstream.base_url.trim().is_empty() {
        return Err(GatewayError::Configuration);
    }

    let route = match classification {
        Classification::Allowed(route) => route,
        _ => return Err(GatewayError::PolicyDenied),
    };

    let cache_key = route
        .endpoint
        .is_cache_candidate()
        .then(|| CacheKey::new(method, uri));

    if let Some(key) = &cache_key {
        if let Some(cached) = state.cache.lookup(key).await {
            metrics::record_cache_lookup(true);
            tracing::debug!(key = %key, "Cache hit");
            return Ok(render(cached, Some(CacheStatus::Hit)));
        }
        metrics::record_cache_lookup(false);
    }

    forward(state, &config, route, uri, request_id, cache_key).await
}

/// Fetch from the backend and apply the privacy and cache rules.
async fn forward(
    state: &AppState,
    config: &GatewayConfig,
    route: Route,
    uri: &Uri,
    request_id: Option<&HeaderValue>,
    cache_key: Option<CacheKey>,
) -> Result<Response, GatewayError> {
    let limits = FetchLimits {
        timeout: Duration::from_secs(config.timeouts.upstream_secs),
        max_body_bytes: config.upstream.max_body_bytes,
    };

    let upstream = state
        .fetcher
        .fetch(&config.upstream.base_url, uri.path(), request_id, limits)
        .await
        .inspect_err(|e| metrics::record_upstream_error(e.kind()))?;

    let mut payload =
        TripPayload::parse(&upstream.body).inspect_err(|e| metrics::record_upstream_error(e.kind()))?;

    verify_trip(route.verify_trip, &payload)?;

    let summary = redact_payload(&mut payload);
    metrics::record_redaction(&summary);

    if upstream.status != StatusCode::OK {
        metrics::record_upstream_error("upstream_status");
        return Err(GatewayError::UpstreamStatus(upstream.status));
    }

    let fetched_at = Utc::now();
    let decision = caching::decide(&route.endpoint, &payload, fetched_at);
    let freshness = Freshness::new(decision, fetched_at);

    let stored = json_success(payload.into_value().to_string(), freshness.as_ref());

    match (cache_key, freshness) {
        (Some(key), Some(freshness)) => {
            let result = state
                .cache
                .store(key.clone(), stored.clone(), freshness.ttl_seconds())
                .await;
            metrics::record_cache_store(result.is_ok());
            if let Err(e) = result {
                tracing::warn!(key = %key, error = %e, "Failed to store response in cache");
            }
            Ok(render(stored, Some(CacheStatus::Miss)))
        }
        _ => Ok(render(stored, None)),
    }
}
