use crate::agent::{Agent, AgentAttributes};
use crate::config::SimulationConfig;
#[cfg(feature = "debug")]
use crate::debug::take_debug_frame;
use crate::error::ConfigError;
use crate::path::PathGeometry;
use crate::registry::AgentRegistry;
use crate::AgentId;
use rand::Rng;
use rand_distr::Distribution;
use std::rc::Rc;

/// A simulation of agents sharing a closed path.
#[derive(Debug)]
pub struct Simulation {
    /// The path shared by every agent.
    path: Rc<PathGeometry>,
    /// The agents being simulated.
    agents: AgentRegistry,
    /// The set of "frozen" agents, which will not move.
    frozen: Vec<AgentId>,
    /// The current frame of simulation.
    frame: usize,
    /// Debugging information from the previously simulated frame.
    #[cfg(feature = "debug")]
    debug: serde_json::Value,
}

impl Simulation {
    /// Creates a new simulation on the given path.
    pub fn new(path: PathGeometry) -> Self {
        Self {
            path: Rc::new(path),
            agents: AgentRegistry::new(),
            frozen: vec![],
            frame: 0,
            #[cfg(feature = "debug")]
            debug: serde_json::Value::Null,
        }
    }

    /// Creates a simulation from a config, validating the path and every agent.
    pub fn from_config(config: &SimulationConfig) -> crate::Result<Self> {
        let mut sim = Self::new(config.path.build()?);
        for placement in &config.agents {
            sim.add_agent_at(&placement.attributes, placement.progress)?;
        }
        Ok(sim)
    }

    /// The path shared by every agent.
    pub fn path(&self) -> &Rc<PathGeometry> {
        &self.path
    }

    /// The agents in the simulation.
    pub fn agents(&self) -> &AgentRegistry {
        &self.agents
    }

    /// Adds an agent at the start of the path.
    pub fn add_agent(&mut self, attributes: &AgentAttributes) -> Result<AgentId, ConfigError> {
        self.add_agent_at(attributes, 0.0)
    }

    /// Adds an agent at the given progress along the path.
    pub fn add_agent_at(
        &mut self,
        attributes: &AgentAttributes,
        progress: f64,
    ) -> Result<AgentId, ConfigError> {
        let id = self.agents.spawn_at(attributes, progress)?;
        if let Some(agent) = self.agents.get_mut(id) {
            agent.update_coords(&self.path);
        }
        Ok(id)
    }

    /// Removes an agent from the simulation.
    pub fn remove_agent(&mut self, id: AgentId) -> Option<Agent> {
        self.frozen.retain(|frozen_id| *frozen_id != id);
        self.agents.remove(id)
    }

    /// Randomly assigns a maximum speed factor to each agent,
    /// which is sampled from a normal distribution with a mean of 1 (no adjustment)
    /// and standard deviation of `stddev`.
    pub fn randomise_speed_factors(&mut self, stddev: f64) -> Result<(), ConfigError> {
        self.randomise_speed_factors_with(&mut rand::thread_rng(), stddev)
    }

    /// Like [Self::randomise_speed_factors], drawing from the given random number generator.
    pub fn randomise_speed_factors_with(
        &mut self,
        rng: &mut impl Rng,
        stddev: f64,
    ) -> Result<(), ConfigError> {
        if !(stddev.is_finite() && stddev >= 0.0) {
            return Err(ConfigError::StdDev(stddev));
        }
        let distr = rand_distr::Normal::new(1.0, stddev).map_err(|_| ConfigError::StdDev(stddev))?;
        for agent in self.agents.iter_mut() {
            let factor = distr.sample(&mut *rng).clamp(0.75, 1.25);
            agent.set_speed_factor(factor);
        }
        Ok(())
    }

    /// Sets the `frozen` attribute of an agent. When an agent is frozen,
    /// it stops immediately and stays where it is until it is no longer frozen.
    /// Other agents still treat it as an obstacle.
    pub fn set_agent_frozen(&mut self, agent_id: AgentId, frozen: bool) {
        let idx = self.frozen.iter().position(|id| *id == agent_id);
        match (frozen, idx) {
            (true, None) if self.agents.contains(agent_id) => {
                self.frozen.push(agent_id);
            }
            (false, Some(idx)) => {
                self.frozen.remove(idx);
            }
            _ => {}
        }
    }

    /// Gets the `frozen` attribute of an agent. [Read more](Self::set_agent_frozen).
    pub fn get_agent_frozen(&self, agent_id: AgentId) -> bool {
        self.frozen.iter().any(|id| *id == agent_id)
    }

    /// Advances the simulation by `dt` time units.
    ///
    /// Every agent reacts to the positions of the others as they were at
    /// the start of the step, so the order agents are updated in does not matter.
    pub fn step(&mut self, dt: f64) {
        let snapshot = self.agents.snapshot();
        let path = &self.path;
        let frozen = &self.frozen;
        for agent in self.agents.iter_mut() {
            if frozen.contains(&agent.id()) {
                agent.halt(path);
            } else {
                agent.tick(dt, &snapshot, path);
            }
        }
        self.frame += 1;

        #[cfg(feature = "debug")]
        {
            self.debug = take_debug_frame();
        }
    }

    /// Gets the current simulation frame index.
    pub fn frame(&self) -> usize {
        self.frame
    }

    /// Returns an iterator over all the agents in the simulation.
    pub fn iter_agents(&self) -> impl Iterator<Item = &Agent> {
        self.agents.iter()
    }

    /// Gets a reference to the agent with the given ID.
    pub fn get_agent(&self, agent_id: AgentId) -> Option<&Agent> {
        self.agents.get(agent_id)
    }

    /// Gets the debugging information for the previously simulated frame as JSON array.
    #[cfg(feature = "debug")]
    pub fn debug(&mut self) -> serde_json::Value {
        self.debug.clone()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::agent::{LoopMode, Regime};
    use crate::math::Point3d;
    use crate::path::RateConvention;
    use assert_approx_eq::assert_approx_eq;
    use rand::SeedableRng;

    fn square() -> PathGeometry {
        PathGeometry::polyline(
            &[
                Point3d::new(0.0, 0.0, 0.0),
                Point3d::new(5.0, 0.0, 0.0),
                Point3d::new(5.0, 0.0, 5.0),
                Point3d::new(0.0, 0.0, 5.0),
            ],
            RateConvention::Uniform,
        )
        .unwrap()
    }

    fn attributes() -> AgentAttributes {
        AgentAttributes {
            max_speed: 1.0,
            acceleration: 1.0,
            min_gap: 2.0,
            loop_mode: LoopMode::Loop,
        }
    }

    #[test]
    fn update_order_does_not_matter() {
        // The leader is updated first. Had the follower seen its new position,
        // the gap would have looked wide enough to keep going.
        let mut sim = Simulation::new(square());
        let lead = sim.add_agent_at(&attributes(), 0.095).unwrap();
        let tail = sim.add_agent_at(&attributes(), 0.0).unwrap();
        sim.step(1.0);

        let lead = sim.get_agent(lead).unwrap();
        assert_eq!(lead.regime(), Regime::Cruising);
        assert_approx_eq!(lead.progress(), 0.145);

        let tail = sim.get_agent(tail).unwrap();
        assert_eq!(tail.regime(), Regime::Blocked);
        assert_eq!(tail.speed(), 0.0);
        assert_eq!(tail.progress(), 0.0);
    }

    #[test]
    fn frozen_agents_stay_put() {
        let mut sim = Simulation::new(square());
        let lead = sim.add_agent_at(&attributes(), 0.2).unwrap();
        let tail = sim.add_agent_at(&attributes(), 0.0).unwrap();
        sim.set_agent_frozen(lead, true);
        assert!(sim.get_agent_frozen(lead));

        for _ in 0..20 {
            sim.step(1.0);
        }
        let lead_agent = sim.get_agent(lead).unwrap();
        assert_eq!(lead_agent.progress(), 0.2);
        assert!(lead_agent.has_stopped());
        // The follower closed up on the frozen agent and stopped behind it
        let tail_agent = sim.get_agent(tail).unwrap();
        assert_eq!(tail_agent.regime(), Regime::Blocked);
        assert!(crate::gap::gap(tail_agent.progress(), 0.2) <= 0.1 + 1e-9);

        sim.set_agent_frozen(lead, false);
        assert!(!sim.get_agent_frozen(lead));
        sim.step(1.0);
        assert_eq!(sim.get_agent(lead).unwrap().speed(), 1.0);
    }

    #[test]
    fn removing_an_agent_unfreezes_it() {
        let mut sim = Simulation::new(square());
        let id = sim.add_agent(&attributes()).unwrap();
        sim.set_agent_frozen(id, true);
        assert!(sim.remove_agent(id).is_some());
        assert!(!sim.get_agent_frozen(id));
        sim.set_agent_frozen(id, true);
        assert!(!sim.get_agent_frozen(id));
    }

    #[test]
    fn randomised_speed_factors_are_clamped() {
        let mut sim = Simulation::new(square());
        for i in 0..20 {
            sim.add_agent_at(&attributes(), i as f64 / 20.0).unwrap();
        }
        let mut rng = rand::rngs::StdRng::from_seed(*b"Vegemite sandwhich is not fun...");
        sim.randomise_speed_factors_with(&mut rng, 1.0).unwrap();
        for agent in sim.iter_agents() {
            assert!((0.75..=1.25).contains(&agent.max_speed()));
        }
        assert_eq!(
            sim.randomise_speed_factors(-1.0),
            Err(ConfigError::StdDev(-1.0))
        );
        assert!(sim.randomise_speed_factors(f64::NAN).is_err());
    }

    #[test]
    fn frame_counter() {
        let mut sim = Simulation::new(square());
        assert_eq!(sim.frame(), 0);
        sim.step(0.1);
        sim.step(0.1);
        assert_eq!(sim.frame(), 2);
    }
}
