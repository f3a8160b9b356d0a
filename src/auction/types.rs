//! Core types and traits for the allocation engine

use std::cmp::Ordering;
use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::geometry::{Location, Metric};

/// Marginal distance cost of a bid.
///
/// Wraps an `f64` and orders it with `total_cmp` so costs can key a heap.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Cost(pub f64);

impl Cost {
    pub const ZERO: Cost = Cost(0.0);

    pub fn val(&self) -> f64 {
        self.0
    }
}

impl PartialEq for Cost {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Cost {}

impl PartialOrd for Cost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cost {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl std::fmt::Display for Cost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3}", self.0)
    }
}

impl From<f64> for Cost {
    fn from(v: f64) -> Self {
        Cost(v)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct TaskId(pub u32);

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct AgentId(pub u32);

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Core trait that task types must implement
pub trait Task: Clone + Debug {
    fn id(&self) -> TaskId;
    fn location(&self) -> Location;
}

/// Core trait for agents
pub trait Agent: Debug {
    fn id(&self) -> AgentId;
    fn location(&self) -> Location;
}

/// Ordered sequence of tasks an agent intends to visit.
///
/// Tasks are unique by id. A capacity of 0 means unbounded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route<T> {
    data: Vec<T>,
    capacity: usize,
}

impl<T: Task> Route<T> {
    /// The bound is only checked on insertion; nothing is reserved up front.
    pub fn new(capacity: usize) -> Self {
        Self {
            data: Vec::new(),
            capacity: if capacity == 0 { usize::MAX } else { capacity },
        }
    }

    pub fn push(&mut self, item: T) -> Result<(), Error> {
        let index = self.data.len();
        self.insert(index, item)
    }

    pub fn insert(&mut self, index: usize, item: T) -> Result<(), Error> {
        if self.contains(item.id()) {
            return Err(Error::ItemAlreadyExists);
        }
        if self.is_full() {
            return Err(Error::CapacityFull);
        }
        if index > self.data.len() {
            return Err(Error::IndexOutOfBounds);
        }

        self.data.insert(index, item);
        Ok(())
    }

    pub fn retain<F>(&mut self, f: F)
    where
        F: FnMut(&T) -> bool,
    {
        self.data.retain(f);
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.capacity != usize::MAX && self.data.len() >= self.capacity
    }

    pub fn first(&self) -> Option<&T> {
        self.data.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn contains(&self, task_id: TaskId) -> bool {
        self.data.iter().any(|t| t.id() == task_id)
    }

    pub fn ids(&self) -> Vec<TaskId> {
        self.data.iter().map(|t| t.id()).collect()
    }

    /// Length of the open path `start -> r0 -> ... -> r(n-1)`.
    pub fn length<M: Metric>(&self, start: &Location, metric: &M) -> f64 {
        let mut total = 0.0;
        let mut current = *start;
        for task in &self.data {
            let next = task.location();
            total += metric.distance(&current, &next);
            current = next;
        }
        total
    }
}

impl<T> IntoIterator for Route<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Route<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}
