//! Cloneable façade for issuing commands to the runtime.
//!
//! [`RuntimeHandle`] hides channel plumbing and offers async helpers for
//! stepping the simulation or streaming its events.
use tokio::sync::{broadcast, mpsc, oneshot};

use survivor_content::LoadedLevel;
use survivor_core::{AgentId, AgentKind, TileCoord, WorldPos};

use super::errors::{Result, RuntimeError};
use super::events::{AgentFrame, SimEvent, TickReport};
use crate::workers::Command;

/// Client-facing handle to interact with the runtime
#[derive(Clone)]
pub struct RuntimeHandle {
    command_tx: mpsc::Sender<Command>,
    event_tx: broadcast::Sender<SimEvent>,
}

impl RuntimeHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>, event_tx: broadcast::Sender<SimEvent>) -> Self {
        Self {
            command_tx,
            event_tx,
        }
    }

    async fn send(&self, command: Command) -> Result<()> {
        self.command_tx
            .send(command)
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)
    }

    async fn request<T>(&self, command: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(command(reply_tx)).await?;
        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Advance the simulation by one tick of `elapsed_ms`.
    pub async fn tick(&self, elapsed_ms: u32) -> Result<TickReport> {
        self.request(|reply| Command::Tick { elapsed_ms, reply })
            .await?
    }

    /// Install a level and return its grid generation.
    pub async fn load_level(&self, level: LoadedLevel) -> Result<u64> {
        self.request(|reply| Command::LoadLevel {
            level: Box::new(level),
            reply,
        })
        .await?
    }

    pub async fn unload_level(&self) -> Result<()> {
        self.request(|reply| Command::UnloadLevel { reply }).await
    }

    /// Move the position every agent pursues.
    pub async fn set_target(&self, target: WorldPos) -> Result<()> {
        self.send(Command::SetTarget { target }).await
    }

    /// Toggle periodic enemy spawns at the level's enemy start.
    pub async fn set_spawning(&self, enabled: bool) -> Result<()> {
        self.send(Command::SetSpawning { enabled }).await
    }

    pub async fn spawn(&self, kind: AgentKind, tile: TileCoord) -> Result<AgentId> {
        self.request(|reply| Command::Spawn { kind, tile, reply })
            .await?
    }

    pub async fn despawn(&self, agent: AgentId) -> Result<()> {
        self.request(|reply| Command::Despawn { agent, reply })
            .await?
    }

    /// Send an NPC away; `false` if the agent cannot retreat.
    pub async fn reject(&self, agent: AgentId) -> Result<bool> {
        self.request(|reply| Command::Reject { agent, reply })
            .await?
    }

    pub async fn set_walkable(&self, tile: TileCoord, walkable: bool) -> Result<()> {
        self.request(|reply| Command::SetWalkable {
            tile,
            walkable,
            reply,
        })
        .await?
    }

    /// Wait until every offloaded search submitted so far has been applied.
    pub async fn settle_paths(&self) -> Result<()> {
        self.request(|reply| Command::SettlePaths { reply }).await
    }

    /// Query the current agent frames (read-only snapshot)
    pub async fn frames(&self) -> Result<Vec<AgentFrame>> {
        self.request(|reply| Command::QueryFrames { reply }).await
    }

    /// Subscribe to simulation events.
    ///
    /// Only events produced after subscribing are delivered.
    pub fn subscribe(&self) -> broadcast::Receiver<SimEvent> {
        self.event_tx.subscribe()
    }
}
