//! Backend fetcher.
//!
//! # Responsibilities
//! - Issue a single GET for `base_url + path`
//! - Enforce the upstream deadline and body size limit
//! - Report status and raw body; the caller decides what a non-200 means
//!
//! # Design Decisions
//! - No retries: every failure is terminal for the request
//! - Timeout errors are distinct from connection errors (504 vs 502)

use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderValue, Request, StatusCode, Uri};
use hyper::body::Incoming;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::error::GatewayError;
use crate::http::X_REQUEST_ID;

/// What the backend sent back.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

/// Per-call limits, taken from the active configuration.
#[derive(Debug, Clone, Copy)]
pub struct FetchLimits {
    pub timeout: Duration,
    pub max_body_bytes: usize,
}

/// HTTP client for the tracking backend.
#[derive(Clone)]
pub struct BackendFetcher {
    client: Client<HttpConnector, Body>,
}

impl Default for BackendFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl BackendFetcher {
    pub fn new() -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self { client }
    }

    /// Fetch `path` from the backend at `base_url`.
    pub async fn fetch(
        &self,
        base_url: &str,
        path: &str,
        request_id: Option<&HeaderValue>,
        limits: FetchLimits,
    ) -> Result<UpstreamResponse, GatewayError> {
        let uri = upstream_uri(base_url, path)?;

        let mut builder = Request::get(uri).header(header::ACCEPT, "application/json");
        if let Some(id) = request_id {
            builder = builder.header(X_REQUEST_ID, id.clone());
        }
        let request = builder
            .body(Body::empty())
            .map_err(|e| GatewayError::UpstreamUnavailable(e.to_string()))?;

        let exchange = async {
            let response: hyper::Response<Incoming> = self
                .client
                .request(request)
                .await
                .map_err(|e| GatewayError::UpstreamUnavailable(e.to_string()))?;

            let status = response.status();
            let body = axum::body::to_bytes(Body::new(response.into_body()), limits.max_body_bytes)
                .await
                .map_err(|e| GatewayError::UpstreamUnavailable(e.to_string()))?;

            Ok::<_, GatewayError>(UpstreamResponse { status, body })
        };

        match tokio::time::timeout(limits.timeout, exchange).await {
            Ok(result) => result,
            Err(_) => Err(GatewayError::UpstreamTimeout(limits.timeout.as_secs())),
        }
    }
}

/// Join the configured base address and the inbound path.
///
/// An empty base address is a configuration error, not a network one.
pub fn upstream_uri(base_url: &str, path: &str) -> Result<Uri, GatewayError> {
    let base = base_url.trim().trim_end_matches('/');
    if base.is_empty() {
        return Err(GatewayError::Configuration);
    }

    format!("{}{}", base, path)
        .parse()
        .map_err(|_| GatewayError::Configuration)
}
