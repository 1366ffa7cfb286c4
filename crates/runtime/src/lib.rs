//! Runtime orchestration for the pursuit simulation.
//!
//! This crate wires the chase controllers from `survivor-core` and the levels
//! from `survivor-content` into a tick loop. Consumers either drive a
//! [`Simulation`] directly or embed [`Runtime`] and interact with it through
//! [`RuntimeHandle`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`simulation`] is the synchronous tick driver
//! - `workers` keeps background tasks internal to the crate
pub mod api;
pub mod runtime;
pub mod simulation;

mod workers;

pub use api::{AgentFrame, Result, RuntimeError, RuntimeHandle, SimEvent, TickReport};
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig};
pub use simulation::{Agent, Simulation};
pub use workers::{PathReply, PathWorkerClient, spawn_path_worker};
