use super::{Allocation, SsiAllocation};
use crate::auction::types::{Agent, Task};
use crate::geometry::Metric;

#[macro_export]
macro_rules! ssi_info {
    ($($arg:tt)+) => {
        tracing::info!(target: "ssi", $($arg)+)
    }
}

#[macro_export]
macro_rules! ssi_debug {
    ($($arg:tt)+) => {
        tracing::debug!(target: "ssi", $($arg)+)
    }
}

/// Log the final assignment table of a pass
pub fn log_allocation(allocation: &Allocation) {
    ssi_info!("Assignment table:");
    for (agent_id, task_id) in &allocation.assignment {
        ssi_info!("  A{} -> T{}", agent_id, task_id);
    }
    if !allocation.unallocated.is_empty() {
        let rest = allocation
            .unallocated
            .iter()
            .map(|t| format!("T{}", t))
            .collect::<Vec<_>>()
            .join(", ");
        ssi_info!("  unallocated: [{}]", rest);
    }
}

/// Log every agent's route and its open-path length
pub fn log_route_table<T, A, M>(ssi: &SsiAllocation<T, M>, agents: &[A])
where
    T: Task,
    A: Agent,
    M: Metric,
{
    for agent in agents {
        let Some(route) = ssi.route(agent.id()) else {
            continue;
        };
        if route.is_empty() {
            ssi_info!("  A{} has no route", agent.id());
            continue;
        }
        let route_str = route
            .iter()
            .map(|t| format!("T{}", t.id()))
            .collect::<Vec<_>>()
            .join(", ");
        ssi_info!(
            "  A{} route: [{}] length {:.2}",
            agent.id(),
            route_str,
            route.length(&agent.location(), &ssi.metric)
        );
    }
}
