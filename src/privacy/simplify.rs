//! Stationary-point removal.
//!
//! A check-in is kept only if both its longitude and its latitude differ
//! from the check-in right before it in the input. The comparison is always
//! against the input neighbour, even when that neighbour was itself dropped.
//! The first point is always kept and order is never changed.

use crate::privacy::Coordinate;

/// Drop points that did not move on both axes since the previous input point.
pub fn remove_stationary(points: &[Coordinate]) -> Vec<Coordinate> {
    let Some(&first) = points.first() else {
        return Vec::new();
    };

    let mut kept = Vec::with_capacity(points.len());
    kept.push(first);
    kept.extend(
        points
            .windows(2)
            .filter(|pair| pair[1].moved_on_both_axes(&pair[0]))
            .map(|pair| pair[1]),
    );
    kept
}
