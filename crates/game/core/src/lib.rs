//! Enemy and NPC pursuit over a tile-grid world.
//!
//! `survivor-core` builds a walkability grid from tile-collision layers, plans
//! grid A* paths from a pursuer to a moving target, throttles replanning, and
//! turns paths into smooth per-tick motion with a facing direction. Agents
//! that are not chasing wander tile to tile.
//!
//! Everything here is synchronous and allocation-light; the runtime crate
//! drives it from a tick loop and may offload searches through the
//! [`chase::Planner`] seam.
pub mod chase;
pub mod config;
pub mod error;
pub mod geometry;
pub mod level;
pub mod nav;
pub mod path;
pub mod repath;
pub mod rng;
pub mod wander;

pub use chase::{
    AgentId, AgentKind, ChaseController, ChaseProfile, ChaseTick, GridPlanner, Mode, PlanPoll,
    PlanRequest, Planner, Radius,
};
pub use config::PursuitConfig;
pub use error::{ErrorSeverity, GameError, NavError};
pub use geometry::{Direction, Facing, MapFrame, Motion, TileCoord, WorldPos};
pub use level::LevelContext;
pub use nav::{CollisionLayer, CollisionRule, MapDimensions, NavGrid, Neighbors, TileLayer};
pub use path::{BlockedEndpoint, CornerPolicy, Path, PathError, PathOptions, find_path, plan};
pub use repath::{RepathScheduler, RepathTicket, ReplanReason};
pub use rng::{PcgRng, RngOracle, SeedContext, compute_seed};
pub use wander::WanderController;
