//! # planes-ssi - auction-based task allocation for a fleet of planes
//!
//! planes-ssi allocates spatially-located tasks to mobile agents with a
//! Sequential Single-Item (SSI) auction. Agents bid the marginal path length of
//! inserting a task into their route at the cheapest position, and the cheapest
//! outstanding bid wins, one task at a time.
//!
//! ## Modules
//!
//! - [`auction`] - Cost model, bid generator, SSI coordinator and core types
//! - [`geometry`] - 2-D locations and distance metrics
//! - [`planes`] - Plane and task types, scenarios, the tick-based world and reports
//! - [`error`] - Error types and handling
//! - [`config`] - Configuration file loading
//! - [`logger`] - Tracing subscriber setup
//!
//! ## Quick Start
//!
//! ```rust
//! use planes_ssi::*;
//!
//! #[derive(Debug, Clone)]
//! struct Pickup(u32, f64, f64);
//! impl Task for Pickup {
//!     fn id(&self) -> TaskId { TaskId(self.0) }
//!     fn location(&self) -> Location { Location::new(self.1, self.2) }
//! }
//!
//! #[derive(Debug)]
//! struct Drone(u32, f64, f64);
//! impl Agent for Drone {
//!     fn id(&self) -> AgentId { AgentId(self.0) }
//!     fn location(&self) -> Location { Location::new(self.1, self.2) }
//! }
//!
//! let drones = vec![Drone(1, 0.0, 0.0), Drone(2, 10.0, 0.0)];
//! let pickups = vec![Pickup(1, 1.0, 0.0), Pickup(2, 9.0, 0.0)];
//! let visibility = VisibilityMap::full(&drones, &pickups);
//!
//! let mut ssi = SsiAllocation::new(None);
//! let allocation = ssi.allocate(&drones, &pickups, &visibility).unwrap();
//! assert_eq!(allocation.target_of(AgentId(1)), Some(TaskId(1)));
//! assert_eq!(allocation.target_of(AgentId(2)), Some(TaskId(2)));
//! ```

pub mod auction;
pub mod config;
pub mod error;
pub mod geometry;
pub mod logger;
pub mod planes;

pub use auction::*;
pub use error::*;
pub use geometry::*;
