use super::{loop_points, wrap01, LoopCurve, Point3d, Vector3d};
use crate::error::InvalidPathError;
use cgmath::prelude::*;

/// A closed polyline, parametrised by arc length.
///
/// Equal steps of the parameter cover equal distances along the polyline,
/// which makes it useful wherever exact distances matter more than a smooth
/// heading.
#[derive(Clone, Debug)]
pub struct PolylineLoop {
    points: Vec<Point3d>,
    /// The distance from the first point to the start of each segment,
    /// followed by the total length.
    offsets: Vec<f64>,
}

impl PolylineLoop {
    /// Creates a closed polyline through the given points.
    pub fn new(points: &[Point3d]) -> Result<Self, InvalidPathError> {
        let points = loop_points(points)?;
        let n = points.len();
        let mut offsets = Vec::with_capacity(n + 1);
        let mut length = 0.0;
        offsets.push(length);
        for i in 0..n {
            length += points[i].distance(points[(i + 1) % n]);
            offsets.push(length);
        }
        if length <= 0.0 {
            return Err(InvalidPathError::ZeroLength);
        }
        Ok(Self { points, offsets })
    }

    /// The total length of the polyline.
    pub fn length(&self) -> f64 {
        self.offsets[self.points.len()]
    }

    /// Finds the segment at the given distance along the polyline.
    fn segment(&self, dist: f64) -> usize {
        let n = self.points.len();
        let idx = self.offsets.partition_point(|offset| *offset <= dist);
        usize::min(idx.saturating_sub(1), n - 1)
    }

    fn segment_vec(&self, idx: usize) -> Vector3d {
        let n = self.points.len();
        self.points[(idx + 1) % n] - self.points[idx]
    }
}

impl LoopCurve for PolylineLoop {
    fn sample(&self, t: f64) -> Point3d {
        let dist = wrap01(t) * self.length();
        let idx = self.segment(dist);
        let seg_len = self.offsets[idx + 1] - self.offsets[idx];
        if seg_len <= 0.0 {
            return self.points[idx];
        }
        let f = (dist - self.offsets[idx]) / seg_len;
        self.points[idx] + self.segment_vec(idx) * f
    }

    fn sample_dt(&self, t: f64) -> Vector3d {
        let dist = wrap01(t) * self.length();
        let mut idx = self.segment(dist);
        // Skip over zero-length segments
        for _ in 0..self.points.len() {
            if self.offsets[idx + 1] > self.offsets[idx] {
                break;
            }
            idx = (idx + 1) % self.points.len();
        }
        self.segment_vec(idx).normalize_to(self.length())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn square() -> PolylineLoop {
        PolylineLoop::new(&[
            Point3d::new(0.0, 0.0, 0.0),
            Point3d::new(5.0, 0.0, 0.0),
            Point3d::new(5.0, 0.0, 5.0),
            Point3d::new(0.0, 0.0, 5.0),
        ])
        .unwrap()
    }

    #[test]
    fn length_is_perimeter() {
        assert_approx_eq!(square().length(), 20.0);
    }

    #[test]
    fn parametrised_by_arc_length() {
        let curve = square();
        let p = curve.sample(0.05);
        assert_approx_eq!(p.x, 1.0);
        assert_approx_eq!(p.z, 0.0);
        let p = curve.sample(0.9);
        assert_approx_eq!(p.x, 0.0);
        assert_approx_eq!(p.z, 2.0);
        assert_eq!(curve.sample(1.0), curve.sample(0.0));
    }

    #[test]
    fn derivative_has_constant_magnitude() {
        let curve = square();
        for i in 0..40 {
            let dt = curve.sample_dt(i as f64 / 40.0);
            assert_approx_eq!(dt.magnitude(), 20.0);
        }
        let dt = curve.sample_dt(0.3).normalize();
        assert_approx_eq!(dt.z, 1.0);
    }

    #[test]
    fn rejects_zero_length() {
        let points = [Point3d::new(1.0, 1.0, 1.0), Point3d::new(1.0, 1.0, 1.0)];
        assert!(matches!(
            PolylineLoop::new(&points),
            Err(InvalidPathError::ZeroLength)
        ));
    }
}
