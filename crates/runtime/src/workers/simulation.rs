//! Simulation worker that owns the authoritative [`crate::Simulation`].
//!
//! Receives commands from [`crate::RuntimeHandle`], applies them between
//! ticks, and broadcasts every [`SimEvent`] a tick produces.

use std::time::Duration;

use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::{Interval, MissedTickBehavior};
use tracing::debug;

use survivor_content::LoadedLevel;
use survivor_core::{AgentId, AgentKind, PursuitConfig, TileCoord, WorldPos};

use crate::api::{AgentFrame, Result, SimEvent, TickReport};
use crate::simulation::Simulation;

/// Commands that can be sent to the simulation worker.
pub enum Command {
    /// Advance every agent by `elapsed_ms`.
    Tick {
        elapsed_ms: u32,
        reply: oneshot::Sender<Result<TickReport>>,
    },
    /// Replace the active level. Replies with the new grid generation.
    LoadLevel {
        level: Box<LoadedLevel>,
        reply: oneshot::Sender<Result<u64>>,
    },
    UnloadLevel {
        reply: oneshot::Sender<()>,
    },
    SetTarget {
        target: WorldPos,
    },
    SetSpawning {
        enabled: bool,
    },
    Spawn {
        kind: AgentKind,
        tile: TileCoord,
        reply: oneshot::Sender<Result<AgentId>>,
    },
    Despawn {
        agent: AgentId,
        reply: oneshot::Sender<Result<()>>,
    },
    Reject {
        agent: AgentId,
        reply: oneshot::Sender<Result<bool>>,
    },
    SetWalkable {
        tile: TileCoord,
        walkable: bool,
        reply: oneshot::Sender<Result<()>>,
    },
    /// Wait for every offloaded search submitted so far.
    SettlePaths {
        reply: oneshot::Sender<()>,
    },
    QueryFrames {
        reply: oneshot::Sender<Vec<AgentFrame>>,
    },
}

/// Background task that processes simulation commands.
pub struct SimulationWorker {
    simulation: Simulation,
    command_rx: mpsc::Receiver<Command>,
    event_tx: broadcast::Sender<SimEvent>,
    ticker: Option<Interval>,
}

impl SimulationWorker {
    pub fn new(
        simulation: Simulation,
        command_rx: mpsc::Receiver<Command>,
        event_tx: broadcast::Sender<SimEvent>,
    ) -> Self {
        Self {
            simulation,
            command_rx,
            event_tx,
            ticker: None,
        }
    }

    /// Ticks on its own every `period` in addition to explicit
    /// [`Command::Tick`]s.
    pub fn with_tick_interval(mut self, period: Duration) -> Self {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        self.ticker = Some(ticker);
        self
    }

    /// Main worker loop. Exits when every handle is dropped.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd).await,
                    None => break,
                },
                _ = next_tick(&mut self.ticker) => self.auto_tick(),
            }
        }
        debug!(tick = self.simulation.current_tick(), "simulation worker stopped");
    }

    async fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Tick { elapsed_ms, reply } => {
                let result = self.simulation.tick(elapsed_ms);
                if let Ok(report) = &result {
                    self.publish(report);
                }
                if reply.send(result).is_err() {
                    debug!("Tick reply channel closed (caller dropped)");
                }
            }
            Command::LoadLevel { level, reply } => {
                let result = self.simulation.load_level(&level);
                if reply.send(result).is_err() {
                    debug!("LoadLevel reply channel closed (caller dropped)");
                }
            }
            Command::UnloadLevel { reply } => {
                self.simulation.unload_level();
                if reply.send(()).is_err() {
                    debug!("UnloadLevel reply channel closed (caller dropped)");
                }
            }
            Command::SetTarget { target } => self.simulation.set_target(target),
            Command::SetSpawning { enabled } => self.simulation.set_spawning(enabled),
            Command::Spawn { kind, tile, reply } => {
                let result = self.simulation.spawn(kind, tile);
                if reply.send(result).is_err() {
                    debug!("Spawn reply channel closed (caller dropped)");
                }
            }
            Command::Despawn { agent, reply } => {
                let result = self.simulation.despawn(agent);
                if reply.send(result).is_err() {
                    debug!("Despawn reply channel closed (caller dropped)");
                }
            }
            Command::Reject { agent, reply } => {
                let result = self.simulation.reject(agent);
                if reply.send(result).is_err() {
                    debug!("Reject reply channel closed (caller dropped)");
                }
            }
            Command::SetWalkable {
                tile,
                walkable,
                reply,
            } => {
                let result = self.simulation.set_walkable(tile, walkable);
                if reply.send(result).is_err() {
                    debug!("SetWalkable reply channel closed (caller dropped)");
                }
            }
            Command::SettlePaths { reply } => {
                self.simulation.settle_paths().await;
                if reply.send(()).is_err() {
                    debug!("SettlePaths reply channel closed (caller dropped)");
                }
            }
            Command::QueryFrames { reply } => {
                if reply.send(self.simulation.frames()).is_err() {
                    debug!("QueryFrames reply channel closed (caller dropped)");
                }
            }
        }
    }

    fn auto_tick(&mut self) {
        match self.simulation.tick(PursuitConfig::TICK_MS) {
            Ok(report) => self.publish(&report),
            Err(err) => debug!(error = %err, "scheduled tick skipped"),
        }
    }

    fn publish(&self, report: &TickReport) {
        for event in &report.events {
            if self.event_tx.send(event.clone()).is_err() {
                // No subscribers.
                break;
            }
        }
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}
