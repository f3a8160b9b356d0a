//! Per-agent visibility sets fed into each allocation pass

use std::collections::{BTreeSet, HashMap};

use super::types::{Agent, AgentId, Task, TaskId};
use crate::geometry::Metric;

/// Which tasks each agent can currently perceive and therefore bid on.
///
/// Agents without an entry perceive nothing.
#[derive(Debug, Clone, Default)]
pub struct VisibilityMap {
    visible: HashMap<AgentId, BTreeSet<TaskId>>,
}

impl VisibilityMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every agent sees every task.
    pub fn full<A: Agent, T: Task>(agents: &[A], tasks: &[T]) -> Self {
        let all: BTreeSet<TaskId> = tasks.iter().map(|t| t.id()).collect();
        Self {
            visible: agents.iter().map(|a| (a.id(), all.clone())).collect(),
        }
    }

    /// Each agent sees the tasks lying within its range, as given by `range_of`.
    pub fn within_range<A, T, M, F>(agents: &[A], tasks: &[T], metric: &M, range_of: F) -> Self
    where
        A: Agent,
        T: Task,
        M: Metric,
        F: Fn(&A) -> f64,
    {
        let mut map = Self::new();
        for agent in agents {
            let origin = agent.location();
            let range = range_of(agent);
            let in_range = tasks
                .iter()
                .filter(|t| metric.distance(&origin, &t.location()) <= range)
                .map(|t| t.id());
            map.extend(agent.id(), in_range);
        }
        map
    }

    pub fn insert(&mut self, agent: AgentId, task: TaskId) {
        self.visible.entry(agent).or_default().insert(task);
    }

    pub fn extend<I: IntoIterator<Item = TaskId>>(&mut self, agent: AgentId, tasks: I) {
        self.visible.entry(agent).or_default().extend(tasks);
    }

    pub fn can_see(&self, agent: AgentId, task: TaskId) -> bool {
        self.visible
            .get(&agent)
            .is_some_and(|tasks| tasks.contains(&task))
    }

    pub fn visible_to(&self, agent: AgentId) -> Option<&BTreeSet<TaskId>> {
        self.visible.get(&agent)
    }

    pub fn is_empty(&self) -> bool {
        self.visible.values().all(|tasks| tasks.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Euclidean, Location};

    #[derive(Debug, Clone)]
    struct Spot(u32, f64, f64);

    impl Task for Spot {
        fn id(&self) -> TaskId {
            TaskId(self.0)
        }
        fn location(&self) -> Location {
            Location::new(self.1, self.2)
        }
    }

    impl Agent for Spot {
        fn id(&self) -> AgentId {
            AgentId(self.0)
        }
        fn location(&self) -> Location {
            Location::new(self.1, self.2)
        }
    }

    #[test]
    fn test_full_visibility() {
        let agents = vec![Spot(1, 0.0, 0.0), Spot(2, 5.0, 5.0)];
        let tasks = vec![Spot(10, 1.0, 1.0), Spot(11, 100.0, 100.0)];
        let map = VisibilityMap::full(&agents, &tasks);

        assert!(map.can_see(AgentId(1), TaskId(11)));
        assert!(map.can_see(AgentId(2), TaskId(10)));
        assert!(!map.can_see(AgentId(3), TaskId(10)));
    }

    #[test]
    fn test_within_range() {
        let agents = vec![Spot(1, 0.0, 0.0)];
        let tasks = vec![Spot(10, 3.0, 4.0), Spot(11, 30.0, 40.0)];
        let map = VisibilityMap::within_range(&agents, &tasks, &Euclidean, |_| 5.0);

        assert!(map.can_see(AgentId(1), TaskId(10)));
        assert!(!map.can_see(AgentId(1), TaskId(11)));
        assert_eq!(map.visible_to(AgentId(1)).map(|s| s.len()), Some(1));
    }

    #[test]
    fn test_empty_map() {
        let mut map = VisibilityMap::new();
        assert!(map.is_empty());
        map.insert(AgentId(7), TaskId(3));
        assert!(!map.is_empty());
        assert!(map.can_see(AgentId(7), TaskId(3)));
    }
}
