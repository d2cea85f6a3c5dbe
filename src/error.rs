//! Request-terminating errors and their HTTP mapping.
//!
//! Every variant ends the current request. None are retried; each maps to one
//! status code and a plain-text body.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::http::response::{plain_text, ALLOW_HEADER_VALUE};

/// Errors that end request processing.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The backend base address is missing from the active configuration.
    #[error("Backend endpoint not specified")]
    Configuration,

    /// Only GET, HEAD and OPTIONS are accepted.
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// The path is not on the allowlist.
    #[error("Endpoint not in allowlist")]
    PolicyDenied,

    /// The payload shows no active trip.
    #[error("No valid trip for this time")]
    TripVerificationFailed,

    /// The backend answered with something that is not JSON.
    #[error("Invalid JSON from API")]
    UpstreamDecode(#[source] serde_json::Error),

    /// Network failure talking to the backend.
    #[error("Upstream request failed")]
    UpstreamUnavailable(String),

    /// The backend did not answer within the configured deadline.
    #[error("Upstream request timed out")]
    UpstreamTimeout(u64),

    /// The backend answered with a non-200 status.
    #[error("Upstream returned status {}", .0.as_u16())]
    UpstreamStatus(StatusCode),
}

impl GatewayError {
    /// HTTP status returned to the client.
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::Configuration => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            GatewayError::PolicyDenied | GatewayError::TripVerificationFailed => {
                StatusCode::FORBIDDEN
            }
            GatewayError::UpstreamDecode(_) | GatewayError::UpstreamUnavailable(_) => {
                StatusCode::BAD_GATEWAY
            }
            GatewayError::UpstreamTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            GatewayError::UpstreamStatus(status) => *status,
        }
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::Configuration => "configuration",
            GatewayError::MethodNotAllowed => "method_not_allowed",
            GatewayError::PolicyDenied => "policy_denied",
            GatewayError::TripVerificationFailed => "trip_verification_failed",
            GatewayError::UpstreamDecode(_) => "upstream_decode",
            GatewayError::UpstreamUnavailable(_) => "upstream_unavailable",
            GatewayError::UpstreamTimeout(_) => "upstream_timeout",
            GatewayError::UpstreamStatus(_) => "upstream_status",
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let mut response = plain_text(self.status(), self.to_string());
        if matches!(self, GatewayError::MethodNotAllowed) {
            response
                .headers_mut()
                .insert(header::ALLOW, HeaderValue::from_static(ALLOW_HEADER_VALUE));
        }
        response
    }
}
