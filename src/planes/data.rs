use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::types::{Plane, PlaneTask};
use crate::auction::types::{AgentId, TaskId};
use crate::error::Error;
use crate::geometry::Location;

/// Scenario definition: the area, its duration, the fleet and every task that
/// will appear during the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Problem {
    pub width: u32,
    pub height: u32,
    /// Scenario length in seconds
    pub duration: u64,
    pub planes: Vec<Plane>,
    pub tasks: Vec<PlaneTask>,
}

impl Default for Problem {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 1000,
            duration: 3600 * 24 * 30,
            planes: Vec::new(),
            tasks: Vec::new(),
        }
    }
}

impl Problem {
    pub fn validate(&self) -> Result<(), Error> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::ValidationError(
                "width and height must be positive".to_string(),
            ));
        }

        let mut plane_ids = HashSet::new();
        for plane in &self.planes {
            plane.validate()?;
            if !plane_ids.insert(plane.id) {
                return Err(Error::ValidationError(format!(
                    "duplicate plane id {}",
                    plane.id
                )));
            }
        }

        let mut task_ids = HashSet::new();
        for task in &self.tasks {
            if !task_ids.insert(task.id) {
                return Err(Error::ValidationError(format!(
                    "duplicate task id {}",
                    task.id
                )));
            }
            if !self.contains(&task.location) {
                return Err(Error::ValidationError(format!(
                    "task {} at {} lies outside the {}x{} area",
                    task.id, task.location, self.width, self.height
                )));
            }
        }
        Ok(())
    }

    pub fn contains(&self, location: &Location) -> bool {
        (0.0..=self.width as f64).contains(&location.x)
            && (0.0..=self.height as f64).contains(&location.y)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProblemGenParams {
    pub planes: usize,
    pub tasks: usize,
    pub width: u32,
    pub height: u32,
    pub duration: u64,
    /// Plane speed in meters per second
    pub speed: f64,
    pub communication_range: f64,
    /// Fixed seed for reproducible scenarios
    pub seed: Option<u64>,
}

impl Default for ProblemGenParams {
    fn default() -> Self {
        Self {
            planes: 5,
            tasks: 50,
            width: 1000,
            height: 1000,
            duration: 3600,
            speed: 10.0,
            communication_range: 250.0,
            seed: None,
        }
    }
}

pub fn generate_random_problem(params: &ProblemGenParams) -> Result<Problem, Error> {
    if params.width == 0 || params.height == 0 || params.duration == 0 {
        return Err(Error::ValidationError(
            "width, height and duration must be positive".to_string(),
        ));
    }

    let mut rng = match params.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    };
    let width = params.width as f64;
    let height = params.height as f64;

    let mut planes = Vec::with_capacity(params.planes);
    for i in 1..=params.planes {
        let location = Location::new(rng.random_range(0.0..width), rng.random_range(0.0..height));
        planes.push(Plane::new(
            AgentId(i as u32),
            location,
            params.speed,
            params.communication_range,
        )?);
    }

    let mut tasks = Vec::with_capacity(params.tasks);
    for i in 1..=params.tasks {
        let location = Location::new(rng.random_range(0.0..width), rng.random_range(0.0..height));
        let time = rng.random_range(0..params.duration);
        tasks.push(PlaneTask::new(TaskId(i as u32), location, time)?);
    }
    tasks.sort_by_key(|t| (t.time, t.id));

    Ok(Problem {
        width: params.width,
        height: params.height,
        duration: params.duration,
        planes,
        tasks,
    })
}

pub fn load_problem(path: &Path) -> Result<Problem> {
    let json = fs::read_to_string(path).context("Failed to read problem file")?;
    let problem: Problem = serde_json::from_str(&json).context("Failed to parse problem json")?;
    problem
        .validate()
        .with_context(|| format!("Invalid problem in {}", path.display()))?;
    Ok(problem)
}

pub fn save_problem(problem: &Problem, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(problem).context("Failed to serialize problem")?;
    fs::write(path, json).context("Failed to write problem file")?;
    Ok(())
}
