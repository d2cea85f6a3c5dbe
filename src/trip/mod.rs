//! Upstream payload model and trip verification.

pub mod payload;
pub mod verify;

pub use payload::TripPayload;
pub use verify::verify_trip;
