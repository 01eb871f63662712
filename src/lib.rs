pub mod body;
pub mod config;
pub mod error;
pub mod gravity;
pub mod region;
pub mod quadtree;
pub mod simulation;
pub mod utils;
pub mod c_api;

pub use body::Body;
pub use config::{Aggregation, Integration, SimulationConfig};
pub use error::{Error, Result};
pub use gravity::Gravity;
pub use quadtree::{Node, Quadtree};
pub use region::Region;
pub use simulation::Simulation;
pub use ultraviolet::DVec2;
