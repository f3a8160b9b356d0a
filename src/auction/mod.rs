pub mod bid;
pub mod insertion;
pub mod ssi;
pub mod types;
pub mod visibility;

pub use bid::{Bid, best_bid};
pub use insertion::{InsertionPoint, cheapest_insertion, cheapest_insertion_into};
pub use ssi::{Allocation, RoutePolicy, SsiAllocation};
pub use types::*;
pub use visibility::VisibilityMap;
