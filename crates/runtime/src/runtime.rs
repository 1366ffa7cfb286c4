//! High-level runtime orchestrator.
//!
//! The runtime owns background workers, wires up command/event channels, and
//! exposes a builder-based API for clients to drive the simulation.

use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::info;

use survivor_content::LoadedLevel;
use survivor_core::PursuitConfig;

use crate::api::{Result, RuntimeError, RuntimeHandle, SimEvent};
use crate::simulation::Simulation;
use crate::workers::{Command, SimulationWorker, spawn_path_worker};

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub pursuit: PursuitConfig,
    pub world_seed: u64,
    /// Run path searches on a background worker instead of inside the tick.
    pub offload_paths: bool,
    pub path_queue_size: usize,
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
    pub max_agents: usize,
    /// Tick automatically at this period. `None` ticks only on request.
    pub tick_interval: Option<Duration>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            pursuit: PursuitConfig::default(),
            world_seed: 0,
            offload_paths: false,
            path_queue_size: 64,
            event_buffer_size: 100,
            command_buffer_size: 32,
            max_agents: Simulation::DEFAULT_MAX_AGENTS,
            tick_interval: None,
        }
    }
}

/// Main runtime that owns the simulation and path workers.
///
/// [`RuntimeHandle`] provides a cloneable façade for clients.
pub struct Runtime {
    handle: RuntimeHandle,
    sim_worker_handle: JoinHandle<()>,
    path_worker_handle: Option<JoinHandle<()>>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    ///
    /// The handle can be shared across clients and async tasks.
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    /// Subscribe to simulation events
    pub fn subscribe_events(&self) -> broadcast::Receiver<SimEvent> {
        self.handle.subscribe()
    }

    /// Shutdown the runtime gracefully
    ///
    /// Waits for the workers, so every cloned handle must be dropped first.
    pub async fn shutdown(self) -> Result<()> {
        drop(self.handle);

        self.sim_worker_handle
            .await
            .map_err(RuntimeError::WorkerJoin)?;

        if let Some(path_handle) = self.path_worker_handle {
            path_handle.await.map_err(RuntimeError::WorkerJoin)?;
        }

        Ok(())
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    level: Option<LoadedLevel>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            level: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn pursuit(mut self, pursuit: PursuitConfig) -> Self {
        self.config.pursuit = pursuit;
        self
    }

    pub fn world_seed(mut self, world_seed: u64) -> Self {
        self.config.world_seed = world_seed;
        self
    }

    /// Enable the background path worker
    pub fn offload_paths(mut self, enable: bool) -> Self {
        self.config.offload_paths = enable;
        self
    }

    pub fn tick_interval(mut self, period: Duration) -> Self {
        self.config.tick_interval = Some(period);
        self
    }

    /// Level installed before the first command is processed.
    pub fn initial_level(mut self, level: LoadedLevel) -> Self {
        self.level = Some(level);
        self
    }

    /// Build the runtime
    pub async fn build(self) -> Result<Runtime> {
        let config = self.config;

        let mut simulation = Simulation::new(config.pursuit.clone(), config.world_seed)
            .with_max_agents(config.max_agents);

        let path_worker_handle = if config.offload_paths {
            let (client, handle) = spawn_path_worker(config.path_queue_size)?;
            simulation = simulation.with_path_worker(client);
            Some(handle)
        } else {
            None
        };

        if let Some(level) = &self.level {
            simulation.load_level(level)?;
        }

        let (command_tx, command_rx) = mpsc::channel::<Command>(config.command_buffer_size);
        let (event_tx, _event_rx) = broadcast::channel::<SimEvent>(config.event_buffer_size);

        let handle = RuntimeHandle::new(command_tx, event_tx.clone());

        let mut sim_worker = SimulationWorker::new(simulation, command_rx, event_tx);
        if let Some(period) = config.tick_interval {
            sim_worker = sim_worker.with_tick_interval(period);
        }

        let sim_worker_handle = tokio::spawn(async move {
            sim_worker.run().await;
        });

        info!(
            world_seed = config.world_seed,
            offload_paths = config.offload_paths,
            "runtime started"
        );

        Ok(Runtime {
            handle,
            sim_worker_handle,
            path_worker_handle,
        })
    }
}
