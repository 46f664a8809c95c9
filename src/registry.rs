use crate::agent::{Agent, AgentAttributes, Direction};
use crate::error::ConfigError;
use crate::gap::gap;
use crate::{AgentId, AgentSet};
use smallvec::SmallVec;

/// The set of agents sharing a path.
#[derive(Clone, Debug, Default)]
pub struct AgentRegistry {
    agents: AgentSet,
}

/// The positions of all agents at one instant, used so that every agent
/// in a tick reacts to the same state regardless of update order.
#[derive(Clone, Debug)]
pub struct Snapshot {
    entries: SmallVec<[Leader; 16]>,
}

/// An agent's position as recorded in a [Snapshot].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Leader {
    /// The agent's ID.
    pub id: AgentId,
    /// The agent's progress along the path.
    pub progress: f64,
}

impl AgentRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Default::default()
    }

    /// Adds an agent at the start of the path.
    pub fn spawn(&mut self, attributes: &AgentAttributes) -> Result<AgentId, ConfigError> {
        self.spawn_at(attributes, 0.0)
    }

    /// Adds an agent at the given progress along the path.
    pub fn spawn_at(
        &mut self,
        attributes: &AgentAttributes,
        progress: f64,
    ) -> Result<AgentId, ConfigError> {
        attributes.validate()?;
        let id = self
            .agents
            .insert_with_key(|id| Agent::new(id, attributes, progress));
        log::debug!("spawned {:?} at {:.4}", id, self.agents[id].progress());
        Ok(id)
    }

    /// Removes an agent, returning it if it existed.
    pub fn remove(&mut self, id: AgentId) -> Option<Agent> {
        let agent = self.agents.remove(id);
        if agent.is_some() {
            log::debug!("removed {:?}", id);
        }
        agent
    }

    /// Gets a reference to the agent with the given ID.
    pub fn get(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(id)
    }

    /// Gets a mutable reference to the agent with the given ID.
    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.get_mut(id)
    }

    /// Whether the registry contains the given agent.
    pub fn contains(&self, id: AgentId) -> bool {
        self.agents.contains_key(id)
    }

    /// The number of agents.
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Whether there are no agents.
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Returns an iterator over all the agents.
    pub fn iter(&self) -> impl Iterator<Item = &Agent> {
        self.agents.values()
    }

    /// Returns a mutable iterator over all the agents.
    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Agent> {
        self.agents.values_mut()
    }

    /// Finds the agent nearest ahead of the given agent, in its direction of travel.
    /// Returns `None` if the agent is unknown or has no other agents to follow.
    pub fn nearest_ahead(&self, id: AgentId) -> Option<AgentId> {
        let agent = self.agents.get(id)?;
        self.snapshot()
            .nearest_ahead(id, agent.progress(), agent.direction())
            .map(|leader| leader.id)
    }

    /// Records the current position of every agent.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            entries: self
                .agents
                .values()
                .map(|agent| Leader {
                    id: agent.id(),
                    progress: agent.progress(),
                })
                .collect(),
        }
    }
}

impl Snapshot {
    /// The number of agents in the snapshot.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the snapshot holds no agents.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Finds the agent with the smallest gap ahead of `progress` in the given
    /// direction, ignoring `id` itself. The first agent found wins ties.
    pub fn nearest_ahead(
        &self,
        id: AgentId,
        progress: f64,
        direction: Direction,
    ) -> Option<Leader> {
        let mut closest: Option<(Leader, f64)> = None;
        for entry in self.entries.iter().filter(|entry| entry.id != id) {
            let diff = match direction {
                Direction::Forward => gap(progress, entry.progress),
                Direction::Backward => gap(entry.progress, progress),
            };
            if closest.map_or(true, |(_, closest_diff)| diff < closest_diff) {
                closest = Some((*entry, diff));
            }
        }
        closest.map(|(leader, _)| leader)
    }
}
