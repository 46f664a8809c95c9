//! Declarative description of a simulation, loadable from JSON.

use crate::agent::AgentAttributes;
use crate::error::InvalidPathError;
use crate::math::Point3d;
use crate::path::{PathGeometry, RateConvention};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How the path is interpolated between its control points.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Interpolation {
    /// A closed Catmull-Rom spline.
    #[default]
    CatmullRom,
    /// Straight lines, parametrised by arc length.
    Linear,
}

/// The description of a closed path.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PathConfig {
    /// The control points, as `[x, y, z]` triples.
    pub points: Vec<[f64; 3]>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub interpolation: Interpolation,
    #[cfg_attr(feature = "serde", serde(default))]
    pub rate: RateConvention,
}

/// An agent and where it starts on the path.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AgentPlacement {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub attributes: AgentAttributes,
    /// The starting progress along the path.
    #[cfg_attr(feature = "serde", serde(default))]
    pub progress: f64,
}

/// The description of a whole simulation.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SimulationConfig {
    pub path: PathConfig,
    #[cfg_attr(feature = "serde", serde(default))]
    pub agents: Vec<AgentPlacement>,
}

impl PathConfig {
    /// Builds the path described by this config.
    pub fn build(&self) -> Result<PathGeometry, InvalidPathError> {
        let points = self
            .points
            .iter()
            .map(|&[x, y, z]| Point3d::new(x, y, z))
            .collect::<Vec<_>>();
        match self.interpolation {
            Interpolation::CatmullRom => PathGeometry::catmull_rom(&points, self.rate),
            Interpolation::Linear => PathGeometry::polyline(&points, self.rate),
        }
    }
}

#[cfg(feature = "serde")]
impl SimulationConfig {
    /// Parses a simulation config from JSON.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::agent::LoopMode;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn builds_paths() {
        let mut config = PathConfig {
            points: vec![[0.0, 0.0, 0.0], [5.0, 0.0, 0.0], [5.0, 0.0, 5.0], [0.0, 0.0, 5.0]],
            interpolation: Interpolation::Linear,
            rate: RateConvention::Local,
        };
        let path = config.build().unwrap();
        assert_approx_eq!(path.path_length(), 20.0, 1e-9);
        assert_eq!(path.convention(), RateConvention::Local);

        config.points.truncate(1);
        assert_eq!(
            config.build().unwrap_err(),
            InvalidPathError::TooFewPoints(1)
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn parses_json() {
        let config = SimulationConfig::from_json(
            r#"{
                "path": {
                    "points": [[0, 0, 0], [5, 0, 0], [5, 0, 5], [0, 0, 5]],
                    "interpolation": "linear"
                },
                "agents": [
                    { "max_speed": 2.0, "acceleration": 0.1, "min_gap": 2.0 },
                    { "max_speed": 3.0, "acceleration": 0.2, "min_gap": 1.0,
                      "loop_mode": "ping_pong", "progress": 0.5 }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(config.path.interpolation, Interpolation::Linear);
        assert_eq!(config.path.rate, RateConvention::Uniform);
        assert_eq!(config.agents.len(), 2);
        assert_eq!(config.agents[0].progress, 0.0);
        assert_eq!(config.agents[0].attributes.loop_mode, LoopMode::Loop);
        assert_eq!(config.agents[1].progress, 0.5);
        assert_eq!(config.agents[1].attributes.loop_mode, LoopMode::PingPong);
        assert_eq!(config.agents[1].attributes.max_speed, 3.0);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn rejects_malformed_json() {
        let err = SimulationConfig::from_json(r#"{ "agents": [] }"#).unwrap_err();
        assert!(matches!(err, crate::Error::Json(_)));
    }
}
