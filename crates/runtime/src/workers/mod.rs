//! Worker tasks that back the runtime orchestration.
//!
//! The simulation worker owns the [`crate::Simulation`] and executes commands,
//! while the path worker offloads searches from the tick loop.

mod path;
mod simulation;

pub use path::{PathReply, PathWorkerClient, spawn_path_worker};
pub use simulation::{Command, SimulationWorker};
