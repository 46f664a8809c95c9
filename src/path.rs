use crate::error::{InvalidPathError, InvalidRangeError};
use crate::math::{
    wrap01, CatmullRomLoop, LookupTable, LoopCurve, Point3d, PolylineLoop, Vector3d,
};
use crate::util::Interval;
use cgmath::prelude::*;
use itertools::Itertools;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The number of chords summed to compute the total length of a path.
const PATH_LENGTH_STEPS: usize = 2048;

/// The number of buckets in the local length scale table.
const SCALE_LUT_SIZE: usize = 1024;

/// Local length scales below this fraction of the mean are considered degenerate.
const DEGENERATE_SCALE: f64 = 1e-6;

/// How a real-world speed is turned into a rate of change of progress.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RateConvention {
    /// Divide by the total path length. Progress advances at a constant rate,
    /// so real speed varies slightly where the curve is sampled unevenly.
    #[default]
    Uniform,
    /// Divide by the local length scale of the curve, so that the real speed
    /// along the path matches the requested speed everywhere.
    Local,
}

/// The geometry of a closed path shared by all agents of a simulation.
pub struct PathGeometry {
    /// The underlying curve.
    curve: Box<dyn LoopCurve>,
    /// The total length of one loop.
    length: f64,
    /// The speed convention used by `progress_rate_for`.
    convention: RateConvention,
    /// The magnitude of the curve's derivative, sampled along the curve.
    scales: LookupTable<f64>,
}

impl PathGeometry {
    /// Creates a path following a closed Catmull-Rom spline through the given points.
    pub fn catmull_rom(
        points: &[Point3d],
        convention: RateConvention,
    ) -> Result<Self, InvalidPathError> {
        Self::from_curve(CatmullRomLoop::new(points)?, convention)
    }

    /// Creates a path following a closed polyline through the given points.
    pub fn polyline(
        points: &[Point3d],
        convention: RateConvention,
    ) -> Result<Self, InvalidPathError> {
        Self::from_curve(PolylineLoop::new(points)?, convention)
    }

    /// Creates a path from any closed curve.
    pub fn from_curve(
        curve: impl LoopCurve + 'static,
        convention: RateConvention,
    ) -> Result<Self, InvalidPathError> {
        let length = chord_length(&curve, PATH_LENGTH_STEPS, Interval::new(0.0, 1.0));
        if !(length.is_finite() && length > 0.0) {
            return Err(InvalidPathError::ZeroLength);
        }

        let step = 1.0 / SCALE_LUT_SIZE as f64;
        let scales = LookupTable::from_samples(Interval::new(0.0, 1.0), step, |t| {
            curve.sample_dt(t).magnitude()
        });
        let degenerate = scales
            .values()
            .filter(|scale| **scale < DEGENERATE_SCALE * length)
            .count();
        if degenerate > 0 && convention == RateConvention::Local {
            log::warn!(
                "{} of {} length scale samples are degenerate; using the mean scale there",
                degenerate,
                SCALE_LUT_SIZE
            );
        }

        Ok(Self {
            curve: Box::new(curve),
            length,
            convention,
            scales,
        })
    }

    /// The convention used to convert speeds into progress rates.
    pub fn convention(&self) -> RateConvention {
        self.convention
    }

    /// The position on the path at the given progress.
    pub fn point_at(&self, progress: f64) -> Point3d {
        self.curve.sample(wrap01(progress))
    }

    /// A unit vector tangent to the path at the given progress,
    /// pointing in the direction of increasing progress.
    pub fn direction_at(&self, progress: f64) -> Vector3d {
        let progress = wrap01(progress);
        let tangent = self.curve.sample_dt(progress);
        if tangent.magnitude2() > 0.0 {
            return tangent.normalize();
        }

        // The spline can momentarily stop, e.g. at the ends of a two point loop
        let delta = 1.0 / PATH_LENGTH_STEPS as f64;
        let chord =
            self.curve.sample(wrap01(progress + delta)) - self.curve.sample(wrap01(progress - delta));
        if chord.magnitude2() > 0.0 {
            chord.normalize()
        } else {
            Vector3d::new(0.0, 0.0, 0.0)
        }
    }

    /// The total length of one loop of the path.
    pub fn path_length(&self) -> f64 {
        self.length
    }

    /// Approximates the length of the path between two progress values by
    /// summing `steps` chords.
    ///
    /// The range must lie within `[0, 1]` and must not run backwards;
    /// ranges crossing the loop origin have to be split by the caller.
    pub fn arc_length(&self, steps: usize, from: f64, to: f64) -> Result<f64, InvalidRangeError> {
        let range = Interval::new(from, to);
        let domain = Interval::new(0.0, 1.0);
        if !range.is_ordered() || !domain.contains(from) || !domain.contains(to) {
            return Err(InvalidRangeError { from, to });
        }
        Ok(self.chord_length(steps, range))
    }

    /// Sums chord lengths over an ordered range, without validating it.
    pub(crate) fn chord_length(&self, steps: usize, range: Interval<f64>) -> f64 {
        chord_length(&self.curve, steps, range)
    }

    /// Converts a real-world speed into a rate of change of progress
    /// at the given point on the path.
    pub fn progress_rate_for(&self, speed: f64, at_progress: f64) -> f64 {
        match self.convention {
            RateConvention::Uniform => speed / self.length,
            RateConvention::Local => speed / self.local_scale(at_progress),
        }
    }

    /// The distance travelled per unit of progress at the given point.
    fn local_scale(&self, progress: f64) -> f64 {
        let scale = *self.scales.sample(wrap01(progress));
        if scale < DEGENERATE_SCALE * self.length {
            self.length
        } else {
            scale
        }
    }
}

impl std::fmt::Debug for PathGeometry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathGeometry")
            .field("length", &self.length)
            .field("convention", &self.convention)
            .finish_non_exhaustive()
    }
}

/// Sums `steps` chord lengths along the curve over the given range.
/// The range is assumed to be ordered.
fn chord_length(curve: &impl LoopCurve, steps: usize, range: Interval<f64>) -> f64 {
    if range.length() <= 0.0 {
        return 0.0;
    }
    let steps = usize::max(steps, 1);
    (0..=steps)
        .map(|i| range.lerp(i as f64 / steps as f64))
        .map(|t| curve.sample(t))
        .tuple_windows()
        .map(|(a, b)| a.distance(b))
        .sum()
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use rand::{Rng, SeedableRng};
    use std::f64::consts::TAU;

    fn roundabout(n: usize, radius: f64) -> Vec<Point3d> {
        (0..n)
            .map(|i| TAU * i as f64 / n as f64)
            .map(|a| Point3d::new(radius * a.cos(), 0.0, radius * a.sin()))
            .collect()
    }

    fn square(convention: RateConvention) -> PathGeometry {
        PathGeometry::polyline(
            &[
                Point3d::new(0.0, 0.0, 0.0),
                Point3d::new(5.0, 0.0, 0.0),
                Point3d::new(5.0, 0.0, 5.0),
                Point3d::new(0.0, 0.0, 5.0),
            ],
            convention,
        )
        .unwrap()
    }

    #[test]
    fn rejects_degenerate_paths() {
        let err = PathGeometry::catmull_rom(&[Point3d::new(0.0, 0.0, 0.0)], Default::default());
        assert_eq!(err.unwrap_err(), InvalidPathError::TooFewPoints(1));

        let same = [Point3d::new(2.0, 0.0, 2.0); 3];
        let err = PathGeometry::catmull_rom(&same, Default::default());
        assert_eq!(err.unwrap_err(), InvalidPathError::ZeroLength);
    }

    #[test]
    fn is_cyclic() {
        let path = PathGeometry::catmull_rom(&roundabout(10, 10.0), Default::default()).unwrap();
        assert_eq!(path.point_at(0.0), path.point_at(1.0));
        assert!(path.point_at(1.0 - 1e-12).distance(path.point_at(0.0)) < 1e-6);

        let mut rng = rand::rngs::StdRng::from_seed(*b"Roundabouts are clockwise here..");
        for _ in 0..100 {
            let p = rng.gen_range(0.0..1.0);
            assert!(path.point_at(p).distance(path.point_at(p + 1.0)) < 1e-9);
            assert!(path.point_at(p).distance(path.point_at(p - 1.0)) < 1e-9);
        }
    }

    #[test]
    fn length_of_a_circle() {
        let path = PathGeometry::catmull_rom(&roundabout(32, 10.0), Default::default()).unwrap();
        assert_approx_eq!(path.path_length(), TAU * 10.0, 0.05);
        assert_eq!(path.path_length(), path.path_length());
    }

    #[test]
    fn direction_is_unit_tangent() {
        let path = PathGeometry::catmull_rom(&roundabout(32, 10.0), Default::default()).unwrap();
        for i in 0..32 {
            let p = i as f64 / 32.0;
            let dir = path.direction_at(p);
            assert_approx_eq!(dir.magnitude(), 1.0);
            // Tangent to a circle is perpendicular to the radius
            let radial = path.point_at(p).to_vec();
            assert!(dir.dot(radial).abs() / radial.magnitude() < 0.05);
        }
    }

    #[test]
    fn direction_of_two_point_loop() {
        let points = [Point3d::new(0.0, 0.0, 0.0), Point3d::new(4.0, 0.0, 0.0)];
        let path = PathGeometry::catmull_rom(&points, Default::default()).unwrap();
        assert_approx_eq!(path.path_length(), 8.0, 1e-6);
        assert_approx_eq!(path.direction_at(0.25).x, 1.0);
        assert_approx_eq!(path.direction_at(0.75).x, -1.0);
    }

    #[test]
    fn arc_length_of_straight_sections() {
        let path = square(RateConvention::Uniform);
        assert_approx_eq!(path.path_length(), 20.0, 1e-9);
        assert_approx_eq!(path.arc_length(50, 0.0, 0.05).unwrap(), 1.0);
        assert_approx_eq!(path.arc_length(25, 0.9, 1.0).unwrap(), 2.0);
        assert_eq!(path.arc_length(10, 0.3, 0.3).unwrap(), 0.0);
        assert_approx_eq!(path.arc_length(0, 0.0, 0.25).unwrap(), 5.0);
    }

    #[test]
    fn arc_length_rejects_backwards_ranges() {
        let path = square(RateConvention::Uniform);
        assert_eq!(
            path.arc_length(50, 0.9, 0.1),
            Err(InvalidRangeError { from: 0.9, to: 0.1 })
        );
        assert!(path.arc_length(50, -0.1, 0.1).is_err());
        assert!(path.arc_length(50, 0.5, 1.5).is_err());
        assert!(path.arc_length(50, f64::NAN, 0.5).is_err());
    }

    #[test]
    fn conventions_agree_on_arc_length_parametrised_paths() {
        let uniform = square(RateConvention::Uniform);
        let local = square(RateConvention::Local);
        for i in 0..20 {
            let p = i as f64 / 20.0 + 0.01;
            assert_approx_eq!(uniform.progress_rate_for(2.0, p), 0.1, 1e-9);
            assert_approx_eq!(local.progress_rate_for(2.0, p), 0.1, 1e-9);
        }
        assert_eq!(uniform.progress_rate_for(0.0, 0.5), 0.0);
        assert_eq!(local.progress_rate_for(0.0, 0.5), 0.0);
    }

    #[test]
    fn local_rate_tracks_real_speed() {
        let path = PathGeometry::catmull_rom(&roundabout(6, 10.0), RateConvention::Local).unwrap();
        let speed = 2.0;
        let dp = 1e-4;
        for i in 0..12 {
            let p = i as f64 / 12.0 + 0.02;
            let rate = path.progress_rate_for(speed, p);
            // Moving by `rate * dt` for a short time covers `speed * dt` metres
            let dist = path.point_at(p + rate * dp).distance(path.point_at(p));
            assert_approx_eq!(dist / dp, speed, 0.05);
        }
    }
}
