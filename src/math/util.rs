use super::Point3d;
use crate::error::InvalidPathError;
use cgmath::prelude::*;

/// Points closer than this are considered coincident when closing a loop.
const COINCIDENT_EPSILON: f64 = 1e-9;

/// Wraps a value into the cyclic domain `[0, 1)`.
///
/// Unlike `f64::rem_euclid`, this never returns exactly `1.0`; tiny
/// negative inputs which would round up to `1.0` map to `0.0` instead.
#[inline(always)]
pub fn wrap01(x: f64) -> f64 {
    let r = x.rem_euclid(1.0);
    if r >= 1.0 {
        0.0
    } else {
        r
    }
}

/// Validates the control points of a closed loop and strips the closing
/// point if the caller repeated the first point at the end.
pub fn loop_points(points: &[Point3d]) -> Result<Vec<Point3d>, InvalidPathError> {
    if let Some(idx) = points
        .iter()
        .position(|p| !(p.x.is_finite() && p.y.is_finite() && p.z.is_finite()))
    {
        return Err(InvalidPathError::NonFinitePoint(idx));
    }

    let mut points = points.to_vec();
    if points.len() > 2 {
        let (first, last) = (points[0], points[points.len() - 1]);
        if first.distance2(last) < COINCIDENT_EPSILON * COINCIDENT_EPSILON {
            points.pop();
        }
    }

    if points.len() < 2 {
        return Err(InvalidPathError::TooFewPoints(points.len()));
    }
    Ok(points)
}
