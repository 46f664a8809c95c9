use super::{loop_points, wrap01, LoopCurve, Point3d, Vector3d};
use crate::error::InvalidPathError;
use cgmath::prelude::*;

/// A closed uniform Catmull-Rom spline passing through every control point.
///
/// Each control point owns an equal share of the parameter domain, so the
/// spline passes through point `i` at `t = i / n`.
#[derive(Clone, Debug)]
pub struct CatmullRomLoop {
    points: Vec<Point3d>,
}

impl CatmullRomLoop {
    /// Creates a spline through the given control points.
    /// A final point equal to the first one is treated as closing the loop.
    pub fn new(points: &[Point3d]) -> Result<Self, InvalidPathError> {
        Ok(Self {
            points: loop_points(points)?,
        })
    }

    /// The control points, without any closing duplicate.
    pub fn points(&self) -> &[Point3d] {
        &self.points
    }

    /// Finds the segment containing `t` and the four points that shape it,
    /// along with the local parameter within the segment.
    fn segment(&self, t: f64) -> ([Vector3d; 4], f64) {
        let n = self.points.len();
        let x = wrap01(t) * n as f64;
        let idx = usize::min(x.floor() as usize, n - 1);
        let local = x - idx as f64;
        let point = |offset: usize| self.points[(idx + offset) % n].to_vec();
        ([point(n - 1), point(0), point(1), point(2)], local)
    }
}

impl LoopCurve for CatmullRomLoop {
    fn sample(&self, t: f64) -> Point3d {
        let ([p0, p1, p2, p3], t) = self.segment(t);
        let (t2, t3) = (t * t, t * t * t);
        Point3d::from_vec(
            0.5 * (2.0 * p1
                + (p2 - p0) * t
                + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t2
                + (3.0 * p1 - p0 - 3.0 * p2 + p3) * t3),
        )
    }

    fn sample_dt(&self, t: f64) -> Vector3d {
        let ([p0, p1, p2, p3], t) = self.segment(t);
        let n = self.points.len() as f64;
        let dt = 0.5
            * ((p2 - p0)
                + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * (2.0 * t)
                + (3.0 * p1 - p0 - 3.0 * p2 + p3) * (3.0 * t * t));
        dt * n
    }
}
