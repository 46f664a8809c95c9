//! Wrap-aware distances between two points on a closed path.

use crate::math::wrap01;
use crate::path::PathGeometry;
use crate::util::Interval;

/// The number of chords used to measure the gap between two agents.
pub const GAP_STEPS: usize = 50;

/// Computes the forward distance in progress from `from` to `to`,
/// wrapping across the loop origin if needed.
///
/// The result is always in `[0, 1)`, and is zero when the two are equal.
pub fn gap(from: f64, to: f64) -> f64 {
    let (from, to) = (wrap01(from), wrap01(to));
    if to >= from {
        to - from
    } else {
        wrap01(to - from + 1.0)
    }
}

/// Computes the forward distance along the path from `from` to `to`,
/// in the path's length units.
///
/// A range crossing the loop origin is measured as two pieces,
/// `from..1` and `0..to`, using half the steps each.
pub fn gap_length(path: &PathGeometry, from: f64, to: f64, steps: usize) -> f64 {
    let (from, to) = (wrap01(from), wrap01(to));
    if to >= from {
        path.chord_length(steps, Interval::new(from, to))
    } else {
        let half = usize::max(steps / 2, 1);
        path.chord_length(half, Interval::new(from, 1.0))
            + path.chord_length(half, Interval::new(0.0, to))
    }
}
