use serde::{Deserialize, Serialize};

use crate::auction::types::{Agent, AgentId, Task, TaskId};
use crate::error::Error;
use crate::geometry::Location;

/// A point that must be visited by one plane.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlaneTask {
    pub id: TaskId,
    pub location: Location,
    /// Simulation second at which the task appears
    #[serde(default)]
    pub time: u64,
}

impl PlaneTask {
    pub fn new(id: TaskId, location: Location, time: u64) -> Result<Self, Error> {
        if !location.x.is_finite() || !location.y.is_finite() {
            return Err(Error::ValidationError(format!(
                "task {} has a non-finite location",
                id
            )));
        }
        Ok(Self { id, location, time })
    }
}

impl std::fmt::Display for PlaneTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "T{}", self.id)
    }
}

impl PartialEq for PlaneTask {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Task for PlaneTask {
    fn id(&self) -> TaskId {
        self.id
    }

    fn location(&self) -> Location {
        self.location
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    pub id: AgentId,
    pub location: Location,
    /// Cruise speed in meters per second
    pub speed: f64,
    /// Furthest distance in meters at which the plane can perceive tasks
    pub communication_range: f64,
}

impl Plane {
    pub fn new(
        id: AgentId,
        location: Location,
        speed: f64,
        communication_range: f64,
    ) -> Result<Self, Error> {
        let plane = Self {
            id,
            location,
            speed,
            communication_range,
        };
        plane.validate()?;
        Ok(plane)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.speed.is_nan() || self.speed <= 0.0 {
            return Err(Error::ValidationError(format!(
                "plane {} speed must be positive",
                self.id
            )));
        }
        if self.communication_range.is_nan() || self.communication_range < 0.0 {
            return Err(Error::ValidationError(format!(
                "plane {} communication_range must be non-negative",
                self.id
            )));
        }
        Ok(())
    }
}

impl Agent for Plane {
    fn id(&self) -> AgentId {
        self.id
    }

    fn location(&self) -> Location {
        self.location
    }
}

impl std::fmt::Display for Plane {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "P{}", self.id)
    }
}
