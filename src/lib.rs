pub mod body;
pub mod config;
pub mod error;
pub mod quadtree;
pub mod simulation;
pub mod utils;
pub mod c_api;

pub use body::Body;
pub use config::SimConfig;
pub use error::SimError;
pub use quadtree::{Node, Quadtree, Region};
pub use simulation::{CandidateQuery, SimState, Simulation};
