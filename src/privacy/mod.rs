//! Privacy redaction of travel lines.
//!
//! # Data Flow
//! ```text
//! line.coordinates
//!     → geofence.rs (points inside a protected zone become the zone's decoy)
//!     → simplify.rs (drop points that did not move on both axes)
//!     → line.coordinates
//! ```
//!
//! # Design Decisions
//! - Redaction never fails; malformed entries are dropped, not passed through
//! - Substitution runs before simplification so runs of decoys collapse
//! - Decoys map to themselves, so substituting a redacted line changes nothing

pub mod geofence;
pub mod simplify;

use serde_json::Value;

use crate::trip::TripPayload;

pub use geofence::{ProtectedZone, PROTECTED_ZONES};
pub use simplify::remove_stationary;

/// A `(longitude, latitude)` pair. Longitude always comes first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub lon: f64,
    pub lat: f64,
}

impl Coordinate {
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Read a GeoJSON-style position. Elements past the second are ignored.
    pub fn from_json(value: &Value) -> Option<Self> {
        let position = value.as_array()?;
        let lon = position.first()?.as_f64()?;
        let lat = position.get(1)?.as_f64()?;
        (lon.is_finite() && lat.is_finite()).then_some(Self { lon, lat })
    }

    pub fn to_json(&self) -> Value {
        Value::Array(vec![Value::from(self.lon), Value::from(self.lat)])
    }

    /// True when both longitude and latitude differ from `other`.
    pub fn moved_on_both_axes(&self, other: &Coordinate) -> bool {
        self.lon != other.lon && self.lat != other.lat
    }
}

/// What a redaction pass did to a payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RedactionSummary {
    /// Points moved onto a decoy.
    pub substituted: usize,
    /// Points dropped as stationary or malformed.
    pub removed: usize,
}

/// Substitute protected points, then drop stationary ones.
pub fn redact(points: &[Coordinate]) -> Vec<Coordinate> {
    let mut points = points.to_vec();
    geofence::substitute_all(&mut points);
    remove_stationary(&points)
}

/// Redact `line.coordinates` in place.
///
/// A payload without a line, or with an empty one, is left untouched.
pub fn redact_payload(payload: &mut TripPayload) -> RedactionSummary {
    let Some((mut points, malformed)) = payload.coordinates() else {
        return RedactionSummary::default();
    };
    if points.is_empty() && malformed == 0 {
        return RedactionSummary::default();
    }

    let substituted = geofence::substitute_all(&mut points);
    let simplified = remove_stationary(&points);
    let removed = malformed + (points.len() - simplified.len());

    payload.set_coordinates(&simplified);

    if malformed > 0 {
        tracing::warn!(malformed, "Dropped malformed coordinates from line");
    }

    RedactionSummary {
        substituted,
        removed,
    }
}
