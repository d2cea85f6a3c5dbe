//! Privacy-preserving edge gateway for a location/trip-tracking backend.
//!
//! Only a fixed allowlist of read-only endpoints is proxied. Travel lines are
//! stripped of points inside protected zones before they leave the gateway,
//! and selected responses are cached according to per-endpoint rules.

pub mod caching;
pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod privacy;
pub mod routing;
pub mod trip;
pub mod upstream;

pub use config::GatewayConfig;
pub use error::GatewayError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
