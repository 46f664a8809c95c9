use self::controller::ControllerParams;
pub use self::controller::{FollowController, Regime};
#[cfg(feature = "debug")]
use crate::debug::debug_line;
use crate::error::ConfigError;
use crate::gap::{gap_length, GAP_STEPS};
use crate::math::{wrap01, Point3d, Vector3d};
use crate::registry::Snapshot;
use crate::{AgentId, PathGeometry};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

mod controller;

/// A simulated agent travelling along the shared path.
#[derive(Clone, Debug)]
pub struct Agent {
    /// The agent's ID
    pub(crate) id: AgentId,
    /// The follow controller
    ctrl: FollowController,
    /// What happens when the agent reaches the end of the path.
    loop_mode: LoopMode,
    /// The normalised position along the path.
    progress: f64,
    /// The speed in length units per unit time.
    speed: f64,
    /// The direction of travel along the path.
    direction: Direction,
    /// The controller regime chosen on the last tick.
    regime: Regime,
    /// Whether a `Once` agent has reached the end of the path.
    finished: bool,
    /// The world space coordinates of the agent.
    world_pos: Point3d,
    /// A world space unit vector aligned with the agent's heading.
    world_dir: Vector3d,
}

/// The attributes of a simulated agent.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AgentAttributes {
    /// The maximum speed, in length units per unit time.
    pub max_speed: f64,
    /// The change in speed per tick.
    pub acceleration: f64,
    /// The gap to the agent ahead below which the agent stops, in length units.
    pub min_gap: f64,
    /// What happens when the agent reaches the end of the path.
    #[cfg_attr(feature = "serde", serde(default))]
    pub loop_mode: LoopMode,
}

/// Determines what happens when an agent's progress passes the end of the path.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum LoopMode {
    /// Stop at the end of the path.
    Once,
    /// Continue from the start of the path.
    #[default]
    Loop,
    /// Turn around and travel back toward the start, and so on.
    PingPong,
}

/// The direction an agent travels along the path.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Direction {
    /// Toward increasing progress.
    #[default]
    Forward,
    /// Toward decreasing progress.
    Backward,
}

impl AgentAttributes {
    /// Checks that the attributes describe a valid agent.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.max_speed.is_finite() && self.max_speed > 0.0) {
            return Err(ConfigError::MaxSpeed(self.max_speed));
        }
        if !(self.acceleration.is_finite() && self.acceleration > 0.0) {
            return Err(ConfigError::Acceleration(self.acceleration));
        }
        if !(self.min_gap.is_finite() && self.min_gap >= 0.0) {
            return Err(ConfigError::MinGap(self.min_gap));
        }
        Ok(())
    }
}

impl Agent {
    /// Creates a new agent. The attributes must have been validated.
    pub(crate) fn new(id: AgentId, attributes: &AgentAttributes, progress: f64) -> Self {
        Self {
            id,
            ctrl: FollowController::new(&ControllerParams {
                max_speed: attributes.max_speed,
                acceleration: attributes.acceleration,
                min_gap: attributes.min_gap,
            }),
            loop_mode: attributes.loop_mode,
            progress: wrap01(progress),
            speed: 0.0,
            direction: Direction::Forward,
            regime: Regime::Cruising,
            finished: false,
            world_pos: Point3d::new(0.0, 0.0, 0.0),
            world_dir: Vector3d::new(0.0, 0.0, 0.0),
        }
    }

    /// Gets the agent's ID.
    pub fn id(&self) -> AgentId {
        self.id
    }

    /// The normalised position along the path.
    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// The agent's speed.
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// The maximum speed, including any speed factor.
    pub fn max_speed(&self) -> f64 {
        self.ctrl.max_speed()
    }

    /// The direction the agent is travelling along the path.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// The agent's loop mode.
    pub fn loop_mode(&self) -> LoopMode {
        self.loop_mode
    }

    /// The controller regime chosen on the last tick.
    pub fn regime(&self) -> Regime {
        self.regime
    }

    /// Whether the agent has reached the end of a `Once` path.
    pub fn has_finished(&self) -> bool {
        self.finished
    }

    /// Whether the agent is stopped.
    pub fn has_stopped(&self) -> bool {
        self.speed == 0.0
    }

    /// The coordinates in world space of the agent.
    pub fn position(&self) -> Point3d {
        self.world_pos
    }

    /// A unit vector in world space aligned with the agent's heading.
    pub fn heading(&self) -> Vector3d {
        self.world_dir
    }

    /// Set the factor multiplied with the agent's maximum speed.
    pub fn set_speed_factor(&mut self, factor: f64) {
        self.ctrl.set_speed_factor(factor);
    }

    /// Measures the distance along the path to the given leader position,
    /// in the agent's direction of travel.
    pub fn gap_to(&self, leader_progress: f64, path: &PathGeometry) -> f64 {
        match self.direction {
            Direction::Forward => gap_length(path, self.progress, leader_progress, GAP_STEPS),
            Direction::Backward => gap_length(path, leader_progress, self.progress, GAP_STEPS),
        }
    }

    /// Advances the agent by one tick.
    ///
    /// # Parameters
    /// * `dt` - The time step
    /// * `snapshot` - The positions of all agents at the start of the tick
    /// * `path` - The shared path
    pub(crate) fn tick(&mut self, dt: f64, snapshot: &Snapshot, path: &PathGeometry) {
        if self.finished {
            self.halt(path);
            return;
        }
        let leader = snapshot.nearest_ahead(self.id, self.progress, self.direction);
        let gap = leader.map(|leader| self.gap_to(leader.progress, path));
        if let (Some(leader), Some(gap)) = (leader, gap) {
            log::trace!("{:?} is {:.3} behind {:?}", self.id, gap, leader.id);
            #[cfg(feature = "debug")]
            debug_line("gap", self.world_pos, path.point_at(leader.progress));
        }

        let (speed, regime) = self.ctrl.update(self.speed, gap);
        if regime != self.regime {
            log::debug!(
                "{:?} now {:?} (gap {:?}, min gap {})",
                self.id,
                regime,
                gap,
                self.ctrl.min_gap()
            );
        }
        self.speed = speed;
        self.regime = regime;

        let delta = path.progress_rate_for(speed, self.progress) * dt;
        self.integrate(delta);
        self.update_coords(path);
    }

    /// Stops the agent where it is.
    pub(crate) fn halt(&mut self, path: &PathGeometry) {
        self.speed = 0.0;
        self.update_coords(path);
    }

    /// Moves the agent by `delta` units of progress, applying the loop mode.
    fn integrate(&mut self, delta: f64) {
        use Direction::*;
        match (self.loop_mode, self.direction) {
            (LoopMode::Loop, _) => {
                self.progress = wrap01(self.progress + delta);
            }
            (LoopMode::Once, _) => {
                let progress = self.progress + delta;
                if progress >= 1.0 {
                    self.progress = 1.0;
                    self.speed = 0.0;
                    self.finished = true;
                    log::debug!("{:?} reached the end of the path", self.id);
                } else {
                    self.progress = progress;
                }
            }
            (LoopMode::PingPong, Forward) => {
                let progress = self.progress + delta;
                if progress > 1.0 {
                    self.progress = (2.0 - progress).clamp(0.0, 1.0);
                    self.direction = Backward;
                } else {
                    self.progress = progress;
                }
            }
            (LoopMode::PingPong, Backward) => {
                let progress = self.progress - delta;
                if progress < 0.0 {
                    self.progress = (-progress).clamp(0.0, 1.0);
                    self.direction = Forward;
                } else {
                    self.progress = progress;
                }
            }
        }
    }

    /// Updates the agent's world coordinates.
    pub(crate) fn update_coords(&mut self, path: &PathGeometry) {
        self.world_pos = path.point_at(self.progress);
        self.world_dir = match self.direction {
            Direction::Forward => path.direction_at(self.progress),
            Direction::Backward => -path.direction_at(self.progress),
        };
    }

    /// Places the agent at the given progress, for tests.
    #[cfg(test)]
    pub(crate) fn set_progress(&mut self, progress: f64) {
        self.progress = progress;
    }
}
