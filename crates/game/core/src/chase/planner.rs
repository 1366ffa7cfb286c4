use super::profile::AgentId;
use crate::geometry::TileCoord;
use crate::nav::NavGrid;
use crate::path::{self, Path, PathOptions};

/// One path search on behalf of an agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlanRequest {
    pub agent: AgentId,
    pub seq: u64,
    pub start: TileCoord,
    pub goal: TileCoord,
}

/// Outcome of submitting a [`PlanRequest`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlanPoll {
    Ready(Path),
    /// The result will be delivered later through
    /// [`super::ChaseController::deliver`].
    Pending,
}

/// Seam between the chase controller and whatever runs the search.
pub trait Planner {
    fn request(&mut self, grid: &NavGrid, request: PlanRequest, options: &PathOptions) -> PlanPoll;
}

/// Runs the search inline on the calling thread.
#[derive(Clone, Copy, Debug, Default)]
pub struct GridPlanner;

impl Planner for GridPlanner {
    fn request(&mut self, grid: &NavGrid, request: PlanRequest, options: &PathOptions) -> PlanPoll {
        match path::plan(grid, request.start, request.goal, options) {
            Ok(path) => PlanPoll::Ready(path),
            Err(err) => {
                tracing::debug!(
                    agent = %request.agent,
                    seq = request.seq,
                    error = %err,
                    "path search failed"
                );
                PlanPoll::Ready(Path::empty())
            }
        }
    }
}
