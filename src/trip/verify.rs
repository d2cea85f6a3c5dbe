//! Active-trip verification.

use crate::error::GatewayError;
use crate::trip::payload::TripPayload;

/// Check that a payload may be released.
///
/// When `verify_trip` is set, a payload whose `trips` list is present but
/// empty is refused. A payload without a `trips` list passes; the endpoints
/// that require verification always include it.
pub fn verify_trip(verify_trip: bool, payload: &TripPayload) -> Result<(), GatewayError> {
    if !verify_trip {
        return Ok(());
    }

    match payload.trip_count() {
        Some(count) if count < 1 => Err(GatewayError::TripVerificationFailed),
        _ => Ok(()),
    }
}
