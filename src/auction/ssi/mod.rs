//! Sequential Single-Item (SSI) auction coordinator
//!
//! One call to [`SsiAllocation::allocate`] is one allocation pass. Every agent
//! places its cheapest insertion bid, all bids go into a min-cost priority queue,
//! and the cheapest outstanding bid is awarded one at a time. The winner then
//! bids again against the shrunken pool. Bids whose task was awarded while they
//! waited in the queue are not removed eagerly; they are detected when popped
//! and only trigger a re-bid for their agent.

pub mod logging;

pub use logging::*;

use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap, HashSet};

use serde::{Deserialize, Serialize};

use crate::auction::bid::{Bid, best_bid};
use crate::auction::types::{Agent, AgentId, Route, Task, TaskId};
use crate::auction::visibility::VisibilityMap;
use crate::error::Error;
use crate::geometry::{Euclidean, Metric};
use crate::{ssi_debug, ssi_info};

/// What happens to routes between allocation passes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RoutePolicy {
    /// Every pass starts from empty routes
    #[default]
    Reset,
    /// Routes survive between passes; tasks already on a route are not re-auctioned
    Persist,
}

/// Configuration for the SSI coordinator
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub route_policy: RoutePolicy,
    /// Maximum number of tasks on a route. 0 means unbounded.
    pub max_route_len: usize,
}

impl Config {
    pub fn with_route_policy(mut self, policy: RoutePolicy) -> Self {
        self.route_policy = policy;
        self
    }

    pub fn with_max_route_len(mut self, max_len: usize) -> Self {
        self.max_route_len = max_len;
        self
    }
}

/// Outcome of one allocation pass
#[derive(Debug, Clone, Default)]
pub struct Allocation {
    /// Next task each agent should move toward. Agents without a target are absent.
    pub assignment: BTreeMap<AgentId, TaskId>,
    /// Inverse of `assignment`
    pub reverse: BTreeMap<TaskId, AgentId>,
    /// Bids awarded during the pass, in award order
    pub accepted: Vec<Bid>,
    /// Bids popped after their task had already been awarded
    pub stale_bids: usize,
    /// Tasks nobody claimed
    pub unallocated: Vec<TaskId>,
}

impl Allocation {
    pub fn target_of(&self, agent: AgentId) -> Option<TaskId> {
        self.assignment.get(&agent).copied()
    }

    pub fn holder_of(&self, task: TaskId) -> Option<AgentId> {
        self.reverse.get(&task).copied()
    }
}

/// SSI auction over a fleet of agents.
///
/// Owns the agents' routes; whether they carry over between passes is decided
/// by [`Config::route_policy`].
#[derive(Debug, Clone)]
pub struct SsiAllocation<T: Task, M: Metric = Euclidean> {
    pub config: Config,
    pub metric: M,
    pub routes: BTreeMap<AgentId, Route<T>>,
}

impl<T: Task> SsiAllocation<T, Euclidean> {
    pub fn new(config: Option<Config>) -> Self {
        Self::with_metric(Euclidean, config)
    }
}

impl<T: Task, M: Metric> SsiAllocation<T, M> {
    pub fn with_metric(metric: M, config: Option<Config>) -> Self {
        Self {
            config: config.unwrap_or_default(),
            metric,
            routes: BTreeMap::new(),
        }
    }

    pub fn route(&self, agent: AgentId) -> Option<&Route<T>> {
        self.routes.get(&agent)
    }

    /// Run one allocation pass.
    ///
    /// `tasks` are the world's uncompleted tasks and seed the pending pool.
    /// Duplicated task or agent ids are ignored after their first occurrence.
    pub fn allocate<A: Agent>(
        &mut self,
        agents: &[A],
        tasks: &[T],
        visibility: &VisibilityMap,
    ) -> Result<Allocation, Error> {
        let mut pending = self.seed_pending(tasks);
        let roster = self.prepare_routes(agents, &mut pending);

        ssi_debug!(
            "Allocating {} pending tasks among {} agents",
            pending.len(),
            roster.len()
        );

        let mut bids = BinaryHeap::with_capacity(roster.len());
        for (agent_id, agent) in &roster {
            match self.next_bid(*agent, &pending, visibility) {
                Some(bid) => {
                    ssi_debug!("New bid: {}", bid);
                    bids.push(Reverse(bid));
                }
                None => ssi_debug!("Agent {} has no bid to make", agent_id),
            }
        }

        let capacity = self.config.max_route_len;
        let mut accepted = Vec::new();
        let mut stale_bids = 0;

        while !pending.is_empty() {
            let Some(Reverse(bid)) = bids.pop() else {
                break;
            };

            match pending.remove(&bid.task) {
                Some(task) => {
                    ssi_debug!("Accepted bid: {}", bid);
                    let route = self
                        .routes
                        .entry(bid.agent)
                        .or_insert_with(|| Route::new(capacity));
                    route.insert(bid.position, task)?;
                    accepted.push(bid);
                }
                None => {
                    ssi_debug!("Stale bid: {}", bid);
                    stale_bids += 1;
                }
            }

            let Some(agent) = roster.get(&bid.agent) else {
                continue;
            };
            if let Some(next) = self.next_bid(*agent, &pending, visibility) {
                ssi_debug!("New bid: {}", next);
                bids.push(Reverse(next));
            }
        }

        let allocation = self.finalize(&roster, pending, accepted, stale_bids);
        ssi_info!(
            "Allocation pass done: {} awarded, {} stale, {} unallocated, {} agents with a target",
            allocation.accepted.len(),
            allocation.stale_bids,
            allocation.unallocated.len(),
            allocation.assignment.len()
        );
        Ok(allocation)
    }

    fn seed_pending(&self, tasks: &[T]) -> BTreeMap<TaskId, T> {
        let mut pending = BTreeMap::new();
        for task in tasks {
            if pending.contains_key(&task.id()) {
                tracing::warn!(target: "ssi", "Duplicate task {} ignored", task.id());
                continue;
            }
            pending.insert(task.id(), task.clone());
        }
        pending
    }

    /// Apply the route policy and index the roster by id.
    fn prepare_routes<'a, A: Agent>(
        &mut self,
        agents: &'a [A],
        pending: &mut BTreeMap<TaskId, T>,
    ) -> BTreeMap<AgentId, &'a A> {
        let mut roster = BTreeMap::new();
        for agent in agents {
            if roster.contains_key(&agent.id()) {
                tracing::warn!(target: "ssi", "Duplicate agent {} ignored", agent.id());
                continue;
            }
            roster.insert(agent.id(), agent);
        }

        match self.config.route_policy {
            RoutePolicy::Reset => self.routes.clear(),
            RoutePolicy::Persist => {
                self.routes.retain(|id, _| roster.contains_key(id));
                let mut claimed = HashSet::new();
                for route in self.routes.values_mut() {
                    // Completed tasks are gone from the pool, and a task may sit on
                    // one route only.
                    route.retain(|t| pending.contains_key(&t.id()) && claimed.insert(t.id()));
                }
                for task_id in claimed {
                    pending.remove(&task_id);
                }
            }
        }

        let capacity = self.config.max_route_len;
        for id in roster.keys() {
            self.routes
                .entry(*id)
                .or_insert_with(|| Route::new(capacity));
        }
        roster
    }

    fn next_bid<A: Agent>(
        &self,
        agent: &A,
        pending: &BTreeMap<TaskId, T>,
        visibility: &VisibilityMap,
    ) -> Option<Bid> {
        let route = self.routes.get(&agent.id())?;
        best_bid(agent, route, pending, visibility, &self.metric)
    }

    fn finalize<A: Agent>(
        &self,
        roster: &BTreeMap<AgentId, &A>,
        pending: BTreeMap<TaskId, T>,
        accepted: Vec<Bid>,
        stale_bids: usize,
    ) -> Allocation {
        let mut allocation = Allocation {
            accepted,
            stale_bids,
            unallocated: pending.into_keys().collect(),
            ..Allocation::default()
        };

        // Rebuilt from scratch, so agents with an empty route simply get no entry.
        for agent_id in roster.keys() {
            if let Some(task) = self.routes.get(agent_id).and_then(|r| r.first()) {
                allocation.assignment.insert(*agent_id, task.id());
                allocation.reverse.insert(task.id(), *agent_id);
            }
        }
        allocation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auction::types::Cost;
    use crate::geometry::Location;

    #[derive(Debug, Clone)]
    struct Job(u32, f64, f64);

    impl Task for Job {
        fn id(&self) -> TaskId {
            TaskId(self.0)
        }
        fn location(&self) -> Location {
            Location::new(self.1, self.2)
        }
    }

    #[derive(Debug)]
    struct Drone(u32, f64, f64);

    impl Agent for Drone {
        fn id(&self) -> AgentId {
            AgentId(self.0)
        }
        fn location(&self) -> Location {
            Location::new(self.1, self.2)
        }
    }

    #[test]
    fn test_single_agent_single_task() {
        let drones = vec![Drone(1, 0.0, 0.0)];
        let jobs = vec![Job(1, 3.0, 4.0)];
        let visibility = VisibilityMap::full(&drones, &jobs);

        let mut ssi = SsiAllocation::new(None);
        let allocation = ssi.allocate(&drones, &jobs, &visibility).unwrap();

        assert_eq!(allocation.target_of(AgentId(1)), Some(TaskId(1)));
        assert_eq!(allocation.holder_of(TaskId(1)), Some(AgentId(1)));
        assert_eq!(allocation.accepted.len(), 1);
        assert!((allocation.accepted[0].cost.val() - 5.0).abs() < 1e-9);
        assert_eq!(ssi.route(AgentId(1)).unwrap().ids(), vec![TaskId(1)]);
    }

    #[test]
    fn test_closest_agent_wins_race() {
        let drones = vec![Drone(1, 0.0, 0.0), Drone(2, 10.0, 0.0)];
        let jobs = vec![Job(1, 1.0, 0.0)];
        let visibility = VisibilityMap::full(&drones, &jobs);

        let mut ssi = SsiAllocation::new(None);
        let allocation = ssi.allocate(&drones, &jobs, &visibility).unwrap();

        assert_eq!(allocation.target_of(AgentId(1)), Some(TaskId(1)));
        assert_eq!(allocation.target_of(AgentId(2)), None);
        assert!(ssi.route(AgentId(2)).unwrap().is_empty());
    }

    #[test]
    fn test_loser_rebids_after_stale_pop() {
        // Both drones want task 1 first; drone 2 loses and takes task 2 instead.
        let drones = vec![Drone(1, 0.0, 0.0), Drone(2, 2.0, 0.0)];
        let jobs = vec![Job(1, 1.0, 0.0), Job(2, 10.0, 0.0)];
        let visibility = VisibilityMap::full(&drones, &jobs);

        let mut ssi = SsiAllocation::new(None);
        let allocation = ssi.allocate(&drones, &jobs, &visibility).unwrap();

        assert_eq!(allocation.target_of(AgentId(1)), Some(TaskId(1)));
        assert_eq!(allocation.target_of(AgentId(2)), Some(TaskId(2)));
        assert_eq!(allocation.stale_bids, 1);
        assert!(allocation.unallocated.is_empty());
    }

    #[test]
    fn test_route_grows_by_insertion() {
        let drones = vec![Drone(1, 0.0, 0.0)];
        let jobs = vec![Job(1, 10.0, 0.0), Job(2, 5.0, 0.0), Job(3, 20.0, 0.0)];
        let visibility = VisibilityMap::full(&drones, &jobs);

        let mut ssi = SsiAllocation::new(None);
        let allocation = ssi.allocate(&drones, &jobs, &visibility).unwrap();

        assert_eq!(
            ssi.route(AgentId(1)).unwrap().ids(),
            vec![TaskId(2), TaskId(1), TaskId(3)]
        );
        assert_eq!(allocation.target_of(AgentId(1)), Some(TaskId(2)));
        // 5 for task 2, then 5 to append task 1, then 10 to append task 3
        let costs: Vec<Cost> = allocation.accepted.iter().map(|b| b.cost).collect();
        assert_eq!(costs, vec![Cost(5.0), Cost(5.0), Cost(10.0)]);
    }

    #[test]
    fn test_max_route_len_leaves_tasks_unallocated() {
        let drones = vec![Drone(1, 0.0, 0.0)];
        let jobs = vec![Job(1, 1.0, 0.0), Job(2, 2.0, 0.0), Job(3, 3.0, 0.0)];
        let visibility = VisibilityMap::full(&drones, &jobs);

        let config = Config::default().with_max_route_len(2);
        let mut ssi = SsiAllocation::new(Some(config));
        let allocation = ssi.allocate(&drones, &jobs, &visibility).unwrap();

        assert_eq!(ssi.route(AgentId(1)).unwrap().len(), 2);
        assert_eq!(allocation.unallocated, vec![TaskId(3)]);
    }

    #[test]
    fn test_huge_max_route_len_from_config() {
        let config: Config = serde_json::from_str(r#"{ "max_route_len": 1000000000000000 }"#).unwrap();
        let drones = vec![Drone(1, 0.0, 0.0), Drone(2, 5.0, 0.0)];
        let jobs = vec![Job(1, 1.0, 0.0), Job(2, 4.0, 0.0)];
        let visibility = VisibilityMap::full(&drones, &jobs);

        let mut ssi = SsiAllocation::new(Some(config));
        let allocation = ssi.allocate(&drones, &jobs, &visibility).unwrap();

        assert_eq!(allocation.target_of(AgentId(1)), Some(TaskId(1)));
        assert_eq!(allocation.target_of(AgentId(2)), Some(TaskId(2)));
        assert!(!ssi.route(AgentId(1)).unwrap().is_full());
    }

    #[test]
    fn test_reset_policy_rebuilds_routes() {
        let drones = vec![Drone(1, 0.0, 0.0)];
        let jobs = vec![Job(1, 1.0, 0.0), Job(2, 2.0, 0.0)];
        let visibility = VisibilityMap::full(&drones, &jobs);

        let mut ssi = SsiAllocation::new(None);
        ssi.allocate(&drones, &jobs, &visibility).unwrap();
        let allocation = ssi.allocate(&drones, &jobs[1..], &visibility).unwrap();

        assert_eq!(ssi.route(AgentId(1)).unwrap().ids(), vec![TaskId(2)]);
        assert_eq!(allocation.accepted.len(), 1);
    }

    #[test]
    fn test_persist_policy_keeps_routes() {
        let drones = vec![Drone(1, 0.0, 0.0), Drone(2, 50.0, 0.0)];
        let jobs = vec![Job(1, 1.0, 0.0), Job(2, 2.0, 0.0)];
        let visibility = VisibilityMap::full(&drones, &jobs);

        let config = Config::default().with_route_policy(RoutePolicy::Persist);
        let mut ssi = SsiAllocation::new(Some(config));
        ssi.allocate(&drones, &jobs, &visibility).unwrap();
        assert_eq!(
            ssi.route(AgentId(1)).unwrap().ids(),
            vec![TaskId(1), TaskId(2)]
        );

        // Task 1 got completed; a new task appears next to drone 2.
        let jobs = vec![Job(2, 2.0, 0.0), Job(3, 49.0, 0.0)];
        let visibility = VisibilityMap::full(&drones, &jobs);
        let allocation = ssi.allocate(&drones, &jobs, &visibility).unwrap();

        assert_eq!(ssi.route(AgentId(1)).unwrap().ids(), vec![TaskId(2)]);
        assert_eq!(allocation.target_of(AgentId(1)), Some(TaskId(2)));
        assert_eq!(allocation.target_of(AgentId(2)), Some(TaskId(3)));
        assert_eq!(allocation.accepted.len(), 1);
    }

    #[test]
    fn test_empty_inputs() {
        let drones: Vec<Drone> = Vec::new();
        let jobs = vec![Job(1, 1.0, 0.0)];
        let mut ssi = SsiAllocation::new(None);

        let allocation = ssi
            .allocate(&drones, &jobs, &VisibilityMap::new())
            .unwrap();
        assert!(allocation.assignment.is_empty());
        assert_eq!(allocation.unallocated, vec![TaskId(1)]);

        let drones = vec![Drone(1, 0.0, 0.0)];
        let allocation = ssi
            .allocate::<Drone>(&drones, &[], &VisibilityMap::new())
            .unwrap();
        assert!(allocation.assignment.is_empty());
        assert!(allocation.reverse.is_empty());
    }

    #[test]
    fn test_duplicates_are_ignored() {
        let drones = vec![Drone(1, 0.0, 0.0), Drone(1, 100.0, 0.0)];
        let jobs = vec![Job(1, 1.0, 0.0), Job(1, 99.0, 0.0)];
        let visibility = VisibilityMap::full(&drones, &jobs);

        let mut ssi = SsiAllocation::new(None);
        let allocation = ssi.allocate(&drones, &jobs, &visibility).unwrap();

        assert_eq!(allocation.accepted.len(), 1);
        assert!((allocation.accepted[0].cost.val() - 1.0).abs() < 1e-9);
    }
}
