//! Discrete-time world that feeds the allocation engine and moves the planes
//!
//! Each tick activates the tasks that have appeared, computes what every plane
//! can see, runs one SSI allocation pass and flies every plane one step toward
//! its assigned task. Reaching a task completes it and removes it from the world.

use std::collections::VecDeque;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::data::Problem;
use super::report::{PlaneTarget, TickLog};
use super::types::{Plane, PlaneTask};
use crate::auction::ssi::{self, Allocation, SsiAllocation};
use crate::auction::types::{Task, TaskId};
use crate::auction::visibility::VisibilityMap;
use crate::error::Error;
use crate::geometry::Euclidean;

/// How per-plane visibility sets are built each tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VisibilityMode {
    /// Every plane sees every active task
    Full,
    /// A plane sees the tasks within its communication range
    #[default]
    CommunicationRange,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Simulated seconds per tick
    pub tick_seconds: u64,
    /// Hard cap on ticks, 0 means run until the scenario ends
    pub max_ticks: u64,
    pub visibility: VisibilityMode,
    pub allocation: ssi::Config,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_seconds: 1,
            max_ticks: 0,
            visibility: VisibilityMode::default(),
            allocation: ssi::Config::default(),
        }
    }
}

#[derive(Debug)]
pub struct World {
    pub config: SimulationConfig,
    time: u64,
    tick: u64,
    duration: u64,
    planes: Vec<Plane>,
    tasks: Vec<PlaneTask>,
    upcoming: VecDeque<PlaneTask>,
    completed: Vec<TaskId>,
    distance_flown: f64,
    ssi: SsiAllocation<PlaneTask>,
    last_allocation: Allocation,
}

impl World {
    pub fn new(problem: Problem, config: SimulationConfig) -> Result<Self, Error> {
        problem.validate()?;
        if config.tick_seconds == 0 {
            return Err(Error::ConfigurationError(
                "tick_seconds must be positive".to_string(),
            ));
        }

        let mut upcoming = problem.tasks;
        upcoming.sort_by_key(|t| (t.time, t.id));

        Ok(Self {
            ssi: SsiAllocation::new(Some(config.allocation.clone())),
            config,
            time: 0,
            tick: 0,
            duration: problem.duration,
            planes: problem.planes,
            tasks: Vec::new(),
            upcoming: upcoming.into(),
            completed: Vec::new(),
            distance_flown: 0.0,
            last_allocation: Allocation::default(),
        })
    }

    pub fn time(&self) -> u64 {
        self.time
    }

    pub fn planes(&self) -> &[Plane] {
        &self.planes
    }

    /// Tasks that have appeared and are not completed yet
    pub fn tasks(&self) -> &[PlaneTask] {
        &self.tasks
    }

    pub fn completed(&self) -> &[TaskId] {
        &self.completed
    }

    pub fn upcoming(&self) -> usize {
        self.upcoming.len()
    }

    pub fn distance_flown(&self) -> f64 {
        self.distance_flown
    }

    pub fn allocator(&self) -> &SsiAllocation<PlaneTask> {
        &self.ssi
    }

    /// Outcome of the most recent allocation pass
    pub fn last_allocation(&self) -> &Allocation {
        &self.last_allocation
    }

    pub fn add_task(&mut self, task: PlaneTask) {
        debug!("t={} task {} appears at {}", self.time, task.id, task.location);
        self.tasks.push(task);
    }

    pub fn remove_task(&mut self, task_id: TaskId) -> Result<PlaneTask, Error> {
        let pos = self
            .tasks
            .iter()
            .position(|t| t.id() == task_id)
            .ok_or(Error::TaskNotFound(task_id))?;
        Ok(self.tasks.remove(pos))
    }

    pub fn visibility(&self) -> VisibilityMap {
        match self.config.visibility {
            VisibilityMode::Full => VisibilityMap::full(&self.planes, &self.tasks),
            VisibilityMode::CommunicationRange => {
                VisibilityMap::within_range(&self.planes, &self.tasks, &Euclidean, |p| {
                    p.communication_range
                })
            }
        }
    }

    /// The scenario is over once its duration has elapsed, or once every task
    /// has appeared and been completed.
    pub fn is_finished(&self) -> bool {
        self.time >= self.duration || (self.upcoming.is_empty() && self.tasks.is_empty())
    }

    pub fn tick(&mut self) -> Result<TickLog, Error> {
        self.tick += 1;
        while self.upcoming.front().is_some_and(|t| t.time <= self.time) {
            if let Some(task) = self.upcoming.pop_front() {
                self.add_task(task);
            }
        }

        let visibility = self.visibility();
        if visibility.is_empty() && !self.tasks.is_empty() {
            debug!(
                "t={} no plane sees any of the {} active tasks",
                self.time,
                self.tasks.len()
            );
        }
        let alloc_start = Instant::now();
        let allocation = self.ssi.allocate(&self.planes, &self.tasks, &visibility)?;
        let allocation_ms = alloc_start.elapsed().as_secs_f64() * 1000.0;

        let completed = self.fly(&allocation)?;
        let log = TickLog {
            tick: self.tick,
            time: self.time,
            active_tasks: self.tasks.len() + completed.len(),
            accepted_bids: allocation.accepted.len(),
            stale_bids: allocation.stale_bids,
            unallocated: allocation.unallocated.len(),
            completed: completed.iter().map(|t| t.0).collect(),
            targets: self
                .planes
                .iter()
                .map(|p| PlaneTarget {
                    plane_id: p.id.0,
                    task_id: allocation.target_of(p.id).map(|t| t.0),
                })
                .collect(),
            allocation_ms,
        };

        self.last_allocation = allocation;
        self.time += self.config.tick_seconds;
        Ok(log)
    }

    /// Tick until the scenario ends or `max_ticks` is hit.
    pub fn run(&mut self) -> Result<Vec<TickLog>, Error> {
        let mut logs = Vec::new();
        while !self.is_finished() {
            if self.config.max_ticks > 0 && self.tick >= self.config.max_ticks {
                info!("Stopping after {} ticks", self.tick);
                break;
            }
            let log = self.tick()?;
            if !log.completed.is_empty() {
                info!(
                    "t={} completed {:?}, {} tasks active, {} still to appear",
                    log.time,
                    log.completed,
                    self.tasks.len(),
                    self.upcoming.len()
                );
            }
            logs.push(log);
        }
        info!(
            "Simulation ended at t={} with {} tasks completed",
            self.time,
            self.completed.len()
        );
        Ok(logs)
    }

    fn fly(&mut self, allocation: &Allocation) -> Result<Vec<TaskId>, Error> {
        let mut done = Vec::new();
        for i in 0..self.planes.len() {
            let plane = self.planes[i];
            let Some(task_id) = allocation.target_of(plane.id) else {
                continue;
            };
            let target = self
                .tasks
                .iter()
                .find(|t| t.id() == task_id)
                .map(|t| t.location)
                .ok_or(Error::TaskNotFound(task_id))?;

            let step = plane.speed * self.config.tick_seconds as f64;
            let (next, reached) = plane.location.step_towards(&target, step);
            self.distance_flown += plane.location.distance(&next);
            self.planes[i].location = next;

            if reached {
                self.remove_task(task_id)?;
                self.completed.push(task_id);
                debug!("t={} {} completed T{}", self.time, plane, task_id);
                done.push(task_id);
            }
        }
        Ok(done)
    }
}
