//! Mathematical structs and functions.

use cgmath::{Point3, Vector3};
pub use catmull_rom::CatmullRomLoop;
pub use curve::LoopCurve;
pub use lut::LookupTable;
pub use polyline::PolylineLoop;
pub use util::*;

mod catmull_rom;
mod curve;
mod lut;
mod polyline;
mod util;

/// A 3D point
pub type Point3d = Point3<f64>;

/// A 3D vector
pub type Vector3d = Vector3<f64>;
