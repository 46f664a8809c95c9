//! A simulation of agents driving around a closed path, each keeping
//! its distance from the agent ahead.

pub use agent::{Agent, AgentAttributes, Direction, FollowController, LoopMode, Regime};
pub use cgmath;
pub use config::{AgentPlacement, Interpolation, PathConfig, SimulationConfig};
pub use error::{ConfigError, Error, InvalidPathError, InvalidRangeError, Result};
pub use gap::{gap, gap_length, GAP_STEPS};
pub use path::{PathGeometry, RateConvention};
pub use registry::{AgentRegistry, Leader, Snapshot};
pub use simulation::Simulation;
use slotmap::{new_key_type, SlotMap};
pub use slotmap::{Key, KeyData};
pub use util::Interval;

mod agent;
mod config;
#[cfg(feature = "debug")]
mod debug;
mod error;
mod gap;
pub mod math;
mod path;
mod registry;
mod simulation;
mod util;

new_key_type! {
    /// Unique ID of an [Agent].
    pub struct AgentId;
}

type AgentSet = SlotMap<AgentId, Agent>;
