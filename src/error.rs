//! Error types.
//!
//! Each failure has its own small error type so that an operation's
//! signature says exactly what can go wrong. [Error] collects them for
//! callers that just want to propagate with `?`.

use thiserror::Error;

/// A path could not be built from the given control points.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum InvalidPathError {
    #[error("a closed path needs at least 2 distinct control points, got {0}")]
    TooFewPoints(usize),

    #[error("control point {0} has a non-finite coordinate")]
    NonFinitePoint(usize),

    #[error("the path has zero length")]
    ZeroLength,
}

/// An arc length was requested over a range that runs backwards
/// or leaves the `[0, 1]` progress domain.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
#[error("invalid progress range {from}..{to}")]
pub struct InvalidRangeError {
    pub from: f64,
    pub to: f64,
}

/// An agent or simulation parameter is out of range.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum ConfigError {
    #[error("max speed must be positive and finite, got {0}")]
    MaxSpeed(f64),

    #[error("acceleration must be positive and finite, got {0}")]
    Acceleration(f64),

    #[error("minimum gap must be non-negative and finite, got {0}")]
    MinGap(f64),

    #[error("standard deviation must be non-negative and finite, got {0}")]
    StdDev(f64),
}

/// The crate-level error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Path(#[from] InvalidPathError),

    #[error(transparent)]
    Range(#[from] InvalidRangeError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("malformed configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// Shorthand result type for fallible simulation operations.
pub type Result<T> = std::result::Result<T, Error>;
