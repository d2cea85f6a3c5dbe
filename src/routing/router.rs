//! Allowlist lookup.
//!
//! # Responsibilities
//! - Hold the ordered allowlist of read-only endpoints
//! - Classify a request (method + path) into exactly one outcome
//! - Return an explicit Denied rather than a silent default
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - First match wins, in declaration order
//! - Pure: no I/O, no clock, no shared state

use axum::http::Method;

use crate::routing::matcher::{PathPattern, Segment};

/// Methods the gateway accepts. Everything else is rejected before routing.
pub const ALLOWED_METHODS: [Method; 3] = [Method::GET, Method::HEAD, Method::OPTIONS];

/// A recognised backend endpoint, with its typed path parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// `/api/location/latest`
    LatestLocation,
    /// `/api/location/history/timestamp/{timestamp}`
    LocationHistory { timestamp: u64 },
    /// `/api/trips`
    TripIndex,
    /// `/api/trips/{id}`
    Trip { id: u64 },
}

impl Endpoint {
    /// Stable low-cardinality label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Endpoint::LatestLocation => "location_latest",
            Endpoint::LocationHistory { .. } => "location_history",
            Endpoint::TripIndex => "trip_index",
            Endpoint::Trip { .. } => "trip",
        }
    }

    /// Whether a response for this endpoint can ever be cached.
    ///
    /// The live location is never cached, so lookups for it are skipped.
    pub fn is_cache_candidate(&self) -> bool {
        !matches!(self, Endpoint::LatestLocation)
    }
}

/// An allowed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub endpoint: Endpoint,
    /// The payload must show an active trip before it is released.
    pub verify_trip: bool,
}

/// Outcome of classifying a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    MethodNotAllowed,
    Denied,
    Allowed(Route),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RuleKind {
    LatestLocation,
    LocationHistory,
    Trips,
}

impl RuleKind {
    fn endpoint(self, captured: Option<u64>) -> Option<Endpoint> {
        match (self, captured) {
            (RuleKind::LatestLocation, None) => Some(Endpoint::LatestLocation),
            (RuleKind::LocationHistory, Some(timestamp)) => {
                Some(Endpoint::LocationHistory { timestamp })
            }
            (RuleKind::Trips, None) => Some(Endpoint::TripIndex),
            (RuleKind::Trips, Some(id)) => Some(Endpoint::Trip { id }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
struct AllowRule {
    pattern: PathPattern,
    kind: RuleKind,
    verify_trip: bool,
}

/// The ordered set of allowed endpoint patterns.
#[derive(Debug, Clone)]
pub struct Allowlist {
    rules: Vec<AllowRule>,
}

impl Default for Allowlist {
    fn default() -> Self {
        Self::standard()
    }
}

impl Allowlist {
    /// The fixed allowlist of read-only tracking endpoints.
    pub fn standard() -> Self {
        let rules = vec![
            AllowRule {
                pattern: PathPattern::literal(&["api", "location", "latest"]),
                kind: RuleKind::LatestLocation,
                verify_trip: true,
            },
            AllowRule {
                pattern: PathPattern::new(vec![
                    Segment::Literal("api"),
                    Segment::Literal("location"),
                    Segment::Literal("history"),
                    Segment::Literal("timestamp"),
                    Segment::Integer,
                ]),
                kind: RuleKind::LocationHistory,
                verify_trip: true,
            },
            AllowRule {
                pattern: PathPattern::new(vec![
                    Segment::Literal("api"),
                    Segment::Literal("trips"),
                    Segment::OptionalInteger,
                ]),
                kind: RuleKind::Trips,
                verify_trip: false,
            },
        ];
        Self { rules }
    }

    /// Classify a request. Pure function of method and path.
    pub fn classify(&self, method: &Method, path: &str) -> Classification {
        if !ALLOWED_METHODS.contains(method) {
            return Classification::MethodNotAllowed;
        }

        self.rules
            .iter()
            .find_map(|rule| {
                let captured = rule.pattern.capture(path)?;
                let endpoint = rule.kind.endpoint(captured)?;
                Some(Classification::Allowed(Route {
                    endpoint,
                    verify_trip: rule.verify_trip,
                }))
            })
            .unwrap_or(Classification::Denied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allowed(endpoint: Endpoint, verify_trip: bool) -> Classification {
        Classification::Allowed(Route {
            endpoint,
            verify_trip,
        })
    }

    #[test]
    fn test_allowlisted_paths() {
        let list = Allowlist::standard();

        assert_eq!(
            list.classify(&Method::GET, "/api/location/latest"),
            allowed(Endpoint::LatestLocation, true)
        );
        assert_eq!(
            list.classify(&Method::GET, "/api/location/history/timestamp/1000000000"),
            allowed(
                Endpoint::LocationHistory {
                    timestamp: 1_000_000_000
                },
                true
            )
        );
        assert_eq!(
            list.classify(&Method::HEAD, "/api/trips"),
            allowed(Endpoint::TripIndex, false)
        );
        assert_eq!(
            list.classify(&Method::OPTIONS, "/api/trips/42"),
            allowed(Endpoint::Trip { id: 42 }, false)
        );
    }

    #[test]
    fn test_disallowed_methods() {
        let list = Allowlist::standard();
        let methods = [
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::TRACE,
            Method::CONNECT,
            Method::from_bytes(b"PURGE").unwrap(),
        ];
        let paths = ["/api/trips", "/api/location/latest", "/", "/admin"];

        for method in &methods {
            for path in paths {
                assert_eq!(
                    list.classify(method, path),
                    Classification::MethodNotAllowed,
                    "{} {}",
                    method,
                    path
                );
            }
        }
    }

    #[test]
    fn test_denied_paths() {
        let list = Allowlist::standard();
        let paths = [
            "/",
            "",
            "/api",
            "/api/location",
            "/api/location/latest/",
            "/api/location/history",
            "/api/location/history/timestamp",
            "/api/location/history/timestamp/",
            "/api/location/history/timestamp/abc",
            "/api/location/history/timestamp/12/34",
            "/api/trips/",
            "/api/trips/abc",
            "/api/trips/42/points",
            "/api/users",
            "/v2/api/trips",
            "/API/trips",
        ];

        for path in paths {
            assert_eq!(
                list.classify(&Method::GET, path),
                Classification::Denied,
                "{}",
                path
            );
        }
    }

    #[test]
    fn test_endpoint_cache_candidates() {
        assert!(!Endpoint::LatestLocation.is_cache_candidate());
        assert!(Endpoint::TripIndex.is_cache_candidate());
        assert!(Endpoint::Trip { id: 1 }.is_cache_candidate());
        assert!(Endpoint::LocationHistory { timestamp: 1 }.is_cache_candidate());
    }
}
