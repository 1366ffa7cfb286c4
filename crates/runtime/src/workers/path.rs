//! Background path search.
//!
//! The simulation submits [`PathJob`]s through a [`PathWorkerClient`], which
//! implements [`Planner`] by answering `Pending` immediately. The worker runs
//! each search on the blocking pool and sends a [`PathReply`] back. The
//! simulation drains replies at the start of every tick without blocking and
//! drops any reply computed against an older grid generation.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use survivor_core::{AgentId, NavGrid, Path, PathOptions, PlanPoll, PlanRequest, Planner, find_path};

use crate::api::{Result, RuntimeError};

/// One search to run off the tick thread.
#[derive(Debug, Clone)]
pub struct PathJob {
    pub request: PlanRequest,
    pub generation: u64,
    pub grid: Arc<NavGrid>,
    pub options: PathOptions,
}

/// Completed search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathReply {
    pub agent: AgentId,
    pub seq: u64,
    pub generation: u64,
    pub path: Path,
}

/// Background task that answers [`PathJob`]s in submission order.
pub struct PathWorker {
    job_rx: mpsc::Receiver<PathJob>,
    reply_tx: mpsc::UnboundedSender<PathReply>,
}

impl PathWorker {
    pub fn new(job_rx: mpsc::Receiver<PathJob>, reply_tx: mpsc::UnboundedSender<PathReply>) -> Self {
        Self { job_rx, reply_tx }
    }

    /// Main worker loop. Exits when every client is dropped.
    pub async fn run(mut self) {
        while let Some(job) = self.job_rx.recv().await {
            let agent = job.request.agent;
            let seq = job.request.seq;

            let outcome = tokio::task::spawn_blocking(move || PathReply {
                agent: job.request.agent,
                seq: job.request.seq,
                generation: job.generation,
                path: find_path(&job.grid, job.request.start, job.request.goal, &job.options),
            })
            .await;

            match outcome {
                Ok(reply) => {
                    if self.reply_tx.send(reply).is_err() {
                        debug!("path reply channel closed (simulation dropped)");
                        break;
                    }
                }
                Err(err) => warn!(%agent, seq, error = %err, "path search task failed"),
            }
        }
        debug!("path worker stopped");
    }
}

/// Simulation-side end of the path worker.
pub struct PathWorkerClient {
    job_tx: mpsc::Sender<PathJob>,
    reply_rx: mpsc::UnboundedReceiver<PathReply>,
    grid: Option<Arc<NavGrid>>,
    generation: u64,
    in_flight: usize,
}

impl PathWorkerClient {
    pub fn new(job_tx: mpsc::Sender<PathJob>, reply_rx: mpsc::UnboundedReceiver<PathReply>) -> Self {
        Self {
            job_tx,
            reply_rx,
            grid: None,
            generation: 0,
            in_flight: 0,
        }
    }

    /// Replaces the grid snapshot that subsequent jobs search.
    pub fn set_grid(&mut self, grid: Option<Arc<NavGrid>>, generation: u64) {
        self.grid = grid;
        self.generation = generation;
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Jobs submitted whose replies have not been drained yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Collects every reply that has already arrived.
    pub fn drain(&mut self) -> Vec<PathReply> {
        let mut replies = Vec::new();
        while let Ok(reply) = self.reply_rx.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);
            replies.push(reply);
        }
        replies
    }

    /// Waits for the next reply. Returns `None` once the worker has stopped.
    pub async fn recv(&mut self) -> Option<PathReply> {
        let reply = self.reply_rx.recv().await?;
        self.in_flight = self.in_flight.saturating_sub(1);
        Some(reply)
    }
}

impl Planner for PathWorkerClient {
    fn request(&mut self, grid: &NavGrid, request: PlanRequest, options: &PathOptions) -> PlanPoll {
        let Some(snapshot) = self.grid.clone() else {
            return PlanPoll::Ready(find_path(grid, request.start, request.goal, options));
        };

        let job = PathJob {
            request,
            generation: self.generation,
            grid: snapshot,
            options: *options,
        };
        match self.job_tx.try_send(job) {
            Ok(()) => {
                self.in_flight += 1;
                PlanPoll::Pending
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                // Dropped; the agent's next scheduled replan supersedes it.
                warn!(agent = %request.agent, seq = request.seq, "path queue full, request dropped");
                PlanPoll::Pending
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                warn!(agent = %request.agent, "path worker gone, searching inline");
                PlanPoll::Ready(find_path(grid, request.start, request.goal, options))
            }
        }
    }
}

/// Spawns a [`PathWorker`] on the current tokio runtime.
pub fn spawn_path_worker(queue_size: usize) -> Result<(PathWorkerClient, JoinHandle<()>)> {
    let runtime = tokio::runtime::Handle::try_current().map_err(RuntimeError::NoAsyncRuntime)?;
    let (job_tx, job_rx) = mpsc::channel(queue_size.max(1));
    let (reply_tx, reply_rx) = mpsc::unbounded_channel();

    let worker = PathWorker::new(job_rx, reply_tx);
    let handle = runtime.spawn(async move {
        worker.run().await;
    });

    Ok((PathWorkerClient::new(job_tx, reply_rx), handle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use survivor_core::TileCoord;

    fn request(seq: u64) -> PlanRequest {
        PlanRequest {
            agent: AgentId(1),
            seq,
            start: TileCoord::new(0, 0),
            goal: TileCoord::new(3, 0),
        }
    }

    #[tokio::test]
    async fn replies_carry_sequence_and_generation() {
        let (mut client, handle) = spawn_path_worker(4).unwrap();
        let grid = NavGrid::open(4, 4).unwrap();
        client.set_grid(Some(Arc::new(grid.clone())), 7);

        let poll = client.request(&grid, request(3), &PathOptions::cardinal());
        assert_eq!(poll, PlanPoll::Pending);
        assert_eq!(client.in_flight(), 1);

        let reply = client.recv().await.unwrap();
        assert_eq!(reply.seq, 3);
        assert_eq!(reply.generation, 7);
        assert_eq!(reply.path.len(), 3);
        assert_eq!(client.in_flight(), 0);

        drop(client);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn searches_inline_without_snapshot() {
        let (mut client, _handle) = spawn_path_worker(4).unwrap();
        let grid = NavGrid::open(4, 4).unwrap();

        match client.request(&grid, request(1), &PathOptions::cardinal()) {
            PlanPoll::Ready(path) => assert_eq!(path.len(), 3),
            PlanPoll::Pending => panic!("expected inline result"),
        }
        assert!(client.drain().is_empty());
    }

    #[test]
    fn spawning_outside_tokio_fails() {
        assert!(matches!(
            spawn_path_worker(4),
            Err(RuntimeError::NoAsyncRuntime(_))
        ));
    }
}
