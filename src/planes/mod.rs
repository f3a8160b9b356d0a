pub mod data;
pub mod report;
pub mod types;
pub mod world;

pub use data::*;
pub use report::*;
pub use types::*;
pub use world::*;
