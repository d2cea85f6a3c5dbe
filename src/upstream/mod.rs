//! Upstream (tracking backend) access.
//!
//! # Data Flow
//! ```text
//! Allowed path + active config (base URL, timeout, body limit)
//!     → client.rs (GET base + path, bounded by timeout)
//!     → UpstreamResponse { status, body } | GatewayError
//! ```

pub mod client;

pub use client::{upstream_uri, BackendFetcher, FetchLimits, UpstreamResponse};
