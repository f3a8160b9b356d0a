//! Cheapest-insertion cost model for a single-vehicle open path

use super::types::{Cost, Route, Task};
use crate::geometry::{Location, Metric};

/// Where a task would go in a route and what it would add to the route length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertionPoint {
    /// Index the task takes in the route, in `0..=route.len()`
    pub position: usize,
    /// Marginal path length incurred by the insertion
    pub cost: Cost,
}

/// Find the cheapest position to insert a task located at `target` into `route`,
/// for an agent currently at `start`.
///
/// Candidates are scanned prepend, then between consecutive entries, then append.
/// Only a strictly cheaper candidate replaces the best one, so ties go to the
/// earliest position. There is no return-to-depot leg.
pub fn cheapest_insertion<T: Task, M: Metric>(
    start: &Location,
    route: &[T],
    target: &Location,
    metric: &M,
) -> InsertionPoint {
    let mut best_position = 0;
    let mut min_cost = metric.distance(start, target);
    if let Some(first) = route.first() {
        let first = first.location();
        min_cost += metric.distance(target, &first) - metric.distance(start, &first);
    }

    for (i, pair) in route.windows(2).enumerate() {
        let prev = pair[0].location();
        let next = pair[1].location();
        let cost = metric.distance(&prev, target) + metric.distance(target, &next)
            - metric.distance(&prev, &next);
        if cost < min_cost {
            min_cost = cost;
            best_position = i + 1;
        }
    }

    if let Some(last) = route.last() {
        let cost = metric.distance(&last.location(), target);
        if cost < min_cost {
            min_cost = cost;
            best_position = route.len();
        }
    }

    InsertionPoint {
        position: best_position,
        cost: Cost(min_cost),
    }
}

/// Convenience wrapper over [`cheapest_insertion`] for a [`Route`].
pub fn cheapest_insertion_into<T: Task, M: Metric>(
    start: &Location,
    route: &Route<T>,
    task: &T,
    metric: &M,
) -> InsertionPoint {
    cheapest_insertion(start, route.as_slice(), &task.location(), metric)
}
