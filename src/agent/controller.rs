#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Gaps this close to the minimum gap are treated as equal to it.
const GAP_TOLERANCE: f64 = 1e-9;

/// The speed regime of a [FollowController].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Regime {
    /// Accelerating toward the maximum speed, or holding it.
    #[default]
    Cruising,
    /// Stopped because the agent ahead is too close.
    Blocked,
}

/// A car following controller which stops dead when the agent ahead
/// is too close, and otherwise accelerates toward its maximum speed.
#[derive(Clone, Debug)]
pub struct FollowController {
    max_speed: f64,
    acceleration: f64,
    min_gap: f64,
    speed_factor: f64,
}

/// The parameters of the follow controller.
pub struct ControllerParams {
    /// The maximum speed in length units per unit time.
    pub max_speed: f64,
    /// The change in speed per tick.
    pub acceleration: f64,
    /// The gap to the agent ahead below which the agent stops, in length units.
    pub min_gap: f64,
}

impl FollowController {
    /// Creates a new follow controller.
    pub fn new(params: &ControllerParams) -> Self {
        FollowController {
            max_speed: params.max_speed,
            acceleration: params.acceleration,
            min_gap: params.min_gap,
            speed_factor: 1.0,
        }
    }

    /// Set the factor multiplied with the maximum speed.
    pub fn set_speed_factor(&mut self, factor: f64) {
        self.speed_factor = factor;
    }

    /// The maximum speed after applying the speed factor.
    pub fn max_speed(&self) -> f64 {
        self.speed_factor * self.max_speed
    }

    /// The gap below which the controller blocks.
    pub fn min_gap(&self) -> f64 {
        self.min_gap
    }

    /// Computes the speed for the next tick.
    ///
    /// # Arguments
    /// * `speed` - The current speed.
    /// * `gap` - The distance along the path to the agent ahead, if there is one.
    pub fn update(&self, speed: f64, gap: Option<f64>) -> (f64, Regime) {
        let gap = gap.unwrap_or(self.min_gap);
        if gap < self.min_gap - GAP_TOLERANCE {
            (0.0, Regime::Blocked)
        } else {
            let speed = (speed + self.acceleration).clamp(0.0, self.max_speed());
            (speed, Regime::Cruising)
        }
    }
}
