use super::{wrap01, Point3d, Vector3d};

/// A closed parametric curve in 3D space.
///
/// The parameter is a normalised progress value. Implementations must treat
/// it cyclically, so that `sample(t) == sample(t + 1.0)` for any `t`.
pub trait LoopCurve {
    /// Samples the curve.
    fn sample(&self, t: f64) -> Point3d;

    /// Samples the derivative of the curve with respect to `t`.
    ///
    /// The default implementation approximates the derivative by sampling
    /// two very nearby points along the curve.
    fn sample_dt(&self, t: f64) -> Vector3d {
        let delta = 0.0001;
        let p1 = self.sample(wrap01(t - 0.5 * delta));
        let p2 = self.sample(wrap01(t + 0.5 * delta));
        (p2 - p1) / delta
    }
}

impl<T: LoopCurve + ?Sized> LoopCurve for &T {
    fn sample(&self, t: f64) -> Point3d {
        (**self).sample(t)
    }

    fn sample_dt(&self, t: f64) -> Vector3d {
        (**self).sample_dt(t)
    }
}

impl<T: LoopCurve + ?Sized> LoopCurve for Box<T> {
    fn sample(&self, t: f64) -> Point3d {
        (**self).sample(t)
    }

    fn sample_dt(&self, t: f64) -> Vector3d {
        (**self).sample_dt(t)
    }
}
