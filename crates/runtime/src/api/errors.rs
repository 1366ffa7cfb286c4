//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from the level context, agent bookkeeping and worker
//! coordination so clients can bubble them up with consistent context.
use thiserror::Error;
use tokio::sync::oneshot;

use survivor_core::{AgentId, ErrorSeverity, GameError, NavError, TileCoord};

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Nav(#[from] NavError),

    #[error("agent {0} does not exist")]
    UnknownAgent(AgentId),

    #[error("no walkable tile near spawn point {0}")]
    NoSpawnTile(TileCoord),

    #[error("agent limit of {limit} reached")]
    AgentLimit { limit: usize },

    #[error("simulation worker command channel closed")]
    CommandChannelClosed,

    #[error("simulation worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error("offloaded path search needs a tokio runtime")]
    NoAsyncRuntime(#[source] tokio::runtime::TryCurrentError),
}

impl GameError for RuntimeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Nav(err) => err.severity(),
            Self::UnknownAgent(_) | Self::NoSpawnTile(_) => ErrorSeverity::Validation,
            Self::AgentLimit { .. } => ErrorSeverity::Recoverable,
            Self::CommandChannelClosed
            | Self::ReplyChannelClosed(_)
            | Self::WorkerJoin(_)
            | Self::NoAsyncRuntime(_) => ErrorSeverity::Fatal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Nav(err) => err.error_code(),
            Self::UnknownAgent(_) => "RUNTIME_UNKNOWN_AGENT",
            Self::NoSpawnTile(_) => "RUNTIME_NO_SPAWN_TILE",
            Self::AgentLimit { .. } => "RUNTIME_AGENT_LIMIT",
            Self::CommandChannelClosed => "RUNTIME_COMMAND_CHANNEL_CLOSED",
            Self::ReplyChannelClosed(_) => "RUNTIME_REPLY_CHANNEL_CLOSED",
            Self::WorkerJoin(_) => "RUNTIME_WORKER_JOIN",
            Self::NoAsyncRuntime(_) => "RUNTIME_NO_ASYNC_RUNTIME",
        }
    }
}
