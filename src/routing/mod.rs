//! Request classification subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path)
//!     → router.rs (method check, ordered allowlist scan)
//!     → matcher.rs (segment-by-segment pattern match, integer extraction)
//!     → Return: MethodNotAllowed | Denied | Allowed(Route)
//! ```
//!
//! # Design Decisions
//! - Allowlist built once at startup, immutable at runtime
//! - No regex in hot path (segment matching only)
//! - Deterministic: same input always yields the same classification
//! - First match wins (declaration order)

pub mod matcher;
pub mod router;

pub use matcher::{PathPattern, Segment};
pub use router::{Allowlist, Classification, Endpoint, Route, ALLOWED_METHODS};
