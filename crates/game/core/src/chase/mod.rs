//! Wander/chase state machine turning paths into per-tick motion.
mod controller;
mod planner;
mod profile;

pub use controller::{ChaseController, ChaseTick, Mode};
pub use planner::{GridPlanner, PlanPoll, PlanRequest, Planner};
pub use profile::{AgentId, AgentKind, ChaseProfile, Radius};
