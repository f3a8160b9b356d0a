//! Bids and the per-agent bid generator

use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::insertion::cheapest_insertion_into;
use super::types::{Agent, AgentId, Cost, Route, Task, TaskId};
use super::visibility::VisibilityMap;
use crate::geometry::Metric;

/// A claim by one agent on one task at a given route position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bid {
    pub agent: AgentId,
    pub task: TaskId,
    pub position: usize,
    pub cost: Cost,
}

impl Ord for Bid {
    /// Ascending cost, then agent id, task id and position.
    fn cmp(&self, other: &Self) -> Ordering {
        self.cost
            .cmp(&other.cost)
            .then_with(|| self.agent.cmp(&other.agent))
            .then_with(|| self.task.cmp(&other.task))
            .then_with(|| self.position.cmp(&other.position))
    }
}

impl PartialOrd for Bid {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for Bid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Bid{{agent=A{}, task=T{}, position={}, cost={}}}",
            self.agent, self.task, self.position, self.cost
        )
    }
}

/// Best bid `agent` can make with its current `route` on the tasks still pending.
///
/// Only tasks the agent can see are considered. `pending` iterates in ascending
/// task id and a candidate must be strictly cheaper to replace the current best,
/// so equal costs go to the lowest task id. Returns `None` when the agent sees no
/// pending task or its route is full.
pub fn best_bid<T, A, M>(
    agent: &A,
    route: &Route<T>,
    pending: &BTreeMap<TaskId, T>,
    visibility: &VisibilityMap,
    metric: &M,
) -> Option<Bid>
where
    T: Task,
    A: Agent,
    M: Metric,
{
    if route.is_full() {
        return None;
    }

    let agent_id = agent.id();
    let start = agent.location();
    let mut best: Option<Bid> = None;

    for (task_id, task) in pending {
        if !visibility.can_see(agent_id, *task_id) {
            continue;
        }

        let point = cheapest_insertion_into(&start, route, task, metric);
        if best.is_none_or(|b| point.cost < b.cost) {
            best = Some(Bid {
                agent: agent_id,
                task: *task_id,
                position: point.position,
                cost: point.cost,
            });
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Euclidean, Location};

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

    fn pool(jobs: &[Job]) -> BTreeMap<TaskId, Job> {
        jobs.iter().map(|j| (j.id(), j.clone())).collect()
    }

    #[test]
    fn test_picks_cheapest_visible_task() {
        let drone = Drone(1, 0.0, 0.0);
        let jobs = vec![Job(1, 10.0, 0.0), Job(2, 2.0, 0.0), Job(3, 1.0, 0.0)];
        let mut visibility = VisibilityMap::new();
        visibility.extend(AgentId(1), [TaskId(1), TaskId(2)]);

        let bid = best_bid(&drone, &Route::new(0), &pool(&jobs), &visibility, &Euclidean)
            .expect("a visible task exists");

        assert_eq!(bid.task, TaskId(2));
        assert_eq!(bid.position, 0);
        assert_eq!(bid.cost, Cost(2.0));
    }

    #[test]
    fn test_no_bid_without_visibility() {
        let drone = Drone(1, 0.0, 0.0);
        let jobs = vec![Job(1, 10.0, 0.0)];
        let bid = best_bid(
            &drone,
            &Route::new(0),
            &pool(&jobs),
            &VisibilityMap::new(),
            &Euclidean,
        );
        assert!(bid.is_none());
    }

    #[test]
    fn test_no_bid_with_full_route() {
        let drone = Drone(1, 0.0, 0.0);
        let mut route = Route::new(1);
        route.push(Job(9, 1.0, 1.0)).unwrap();
        let jobs = vec![Job(1, 10.0, 0.0)];
        let visibility = VisibilityMap::full(&[Drone(1, 0.0, 0.0)], &jobs);

        assert!(best_bid(&drone, &route, &pool(&jobs), &visibility, &Euclidean).is_none());
    }

    #[test]
    fn test_equal_cost_goes_to_lowest_task_id() {
        let drone = Drone(1, 0.0, 0.0);
        let jobs = vec![Job(7, 0.0, 5.0), Job(3, 5.0, 0.0), Job(5, -5.0, 0.0)];
        let visibility = VisibilityMap::full(&[Drone(1, 0.0, 0.0)], &jobs);

        let bid = best_bid(&drone, &Route::new(0), &pool(&jobs), &visibility, &Euclidean).unwrap();
        assert_eq!(bid.task, TaskId(3));
    }

    #[test]
    fn test_bid_ordering() {
        let cheap = Bid {
            agent: AgentId(2),
            task: TaskId(1),
            position: 0,
            cost: Cost(1.0),
        };
        let tie = Bid {
            agent: AgentId(1),
            ..cheap
        };
        let dear = Bid {
            cost: Cost(3.0),
            ..cheap
        };
        assert!(tie < cheap);
        assert!(cheap < dear);
    }
}
