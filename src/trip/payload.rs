//! Decoded upstream payload.
//!
//! The backend's JSON is kept as an untyped document. Only a handful of
//! fields are read (`trips`, `time`, `endtime`) and only `line.coordinates`
//! is ever rewritten; everything else passes through untouched.

use serde_json::Value;

use crate::error::GatewayError;
use crate::privacy::Coordinate;

/// A decoded backend response body.
#[derive(Debug, Clone, PartialEq)]
pub struct TripPayload {
    document: Value,
}

impl TripPayload {
    /// Decode a raw upstream body. Anything that is not JSON is rejected.
    pub fn parse(raw: impl AsRef<[u8]>) -> Result<Self, GatewayError> {
        let document = serde_json::from_slice(raw.as_ref()).map_err(GatewayError::UpstreamDecode)?;
        Ok(Self { document })
    }

    pub fn from_value(document: Value) -> Self {
        Self { document }
    }

    pub fn as_value(&self) -> &Value {
        &self.document
    }

    pub fn into_value(self) -> Value {
        self.document
    }

    /// Length of the `trips` list, if the payload carries one.
    pub fn trip_count(&self) -> Option<usize> {
        self.document.get("trips")?.as_array().map(Vec::len)
    }

    /// `time` in Unix epoch seconds.
    pub fn time(&self) -> Option<f64> {
        self.number("time")
    }

    /// `endtime` in Unix epoch seconds.
    pub fn end_time(&self) -> Option<f64> {
        self.number("endtime")
    }

    fn number(&self, field: &str) -> Option<f64> {
        self.document.get(field)?.as_f64().filter(|v| v.is_finite())
    }

    /// The travel line, or `None` when the payload has no usable
    /// `line.coordinates` list.
    ///
    /// Entries that are not `[lon, lat, ...]` number arrays are skipped; the
    /// second element of the tuple counts them.
    pub fn coordinates(&self) -> Option<(Vec<Coordinate>, usize)> {
        let raw = self.document.get("line")?.get("coordinates")?.as_array()?;

        let mut skipped = 0;
        let coordinates = raw
            .iter()
            .filter_map(|entry| {
                let parsed = Coordinate::from_json(entry);
                if parsed.is_none() {
                    skipped += 1;
                }
                parsed
            })
            .collect();

        Some((coordinates, skipped))
    }

    /// Replace `line.coordinates`. Does nothing if the payload has no line.
    pub fn set_coordinates(&mut self, coordinates: &[Coordinate]) {
        let Some(slot) = self
            .document
            .get_mut("line")
            .and_then(|line| line.get_mut("coordinates"))
        else {
            return;
        };

        *slot = Value::Array(coordinates.iter().map(Coordinate::to_json).collect());
    }
}
