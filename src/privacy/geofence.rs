//! Protected-zone substitution.
//!
//! Any point strictly inside a protected zone is moved to that zone's decoy,
//! a well-known public landmark. Zones are tested in order and the first
//! containing zone wins.

use crate::privacy::Coordinate;

/// An axis-aligned longitude/latitude box with its decoy point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProtectedZone {
    pub name: &'static str,
    pub min_lon: f64,
    pub max_lon: f64,
    pub min_lat: f64,
    pub max_lat: f64,
    pub decoy: Coordinate,
}

impl ProtectedZone {
    /// Strict containment; points on an edge are outside.
    pub fn contains(&self, point: &Coordinate) -> bool {
        self.min_lon < point.lon
            && point.lon < self.max_lon
            && self.min_lat < point.lat
            && point.lat < self.max_lat
    }
}

/// Austin, mapped to the Texas State Capitol.
pub const AUSTIN: ProtectedZone = ProtectedZone {
    name: "austin",
    min_lon: -97.92835235595705,
    max_lon: -97.58090972900392,
    min_lat: 30.1457209625174,
    max_lat: 30.427361303226743,
    decoy: Coordinate {
        lon: -97.740535,
        lat: 30.274183,
    },
};

/// Tulsa, mapped to the Center of the Universe.
pub const TULSA: ProtectedZone = ProtectedZone {
    name: "tulsa",
    min_lon: -96.0071182,
    max_lon: -95.7616425,
    min_lat: 35.9557765,
    max_lat: 36.1655966,
    decoy: Coordinate {
        lon: -95.991516,
        lat: 36.156859,
    },
};

/// Zones in evaluation order.
pub const PROTECTED_ZONES: [ProtectedZone; 2] = [AUSTIN, TULSA];

/// The decoy for `point`, or `point` itself when it is in no zone.
pub fn substitute(point: Coordinate) -> Coordinate {
    PROTECTED_ZONES
        .iter()
        .find(|zone| zone.contains(&point))
        .map(|zone| zone.decoy)
        .unwrap_or(point)
}

/// Apply [`substitute`] to every point, returning how many were moved.
pub fn substitute_all(points: &mut [Coordinate]) -> usize {
    let mut moved = 0;
    for point in points.iter_mut() {
        let replaced = substitute(*point);
        if replaced != *point {
            *point = replaced;
            moved += 1;
        }
    }
    moved
}
