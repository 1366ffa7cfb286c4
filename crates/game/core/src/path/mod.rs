//! Grid A* from a pursuer tile to a goal tile.
//!
//! The planner is stateless: every call takes the grid by reference and
//! returns an owned [`Path`]. [`find_path`] never fails and reports any failure
//! as an empty path; [`plan`] exposes the reason.
mod astar;

pub use astar::{find_path, plan};

use std::slice;

use crate::error::{ErrorSeverity, GameError};
use crate::geometry::TileCoord;

/// Cost of one orthogonal step in fixed-point units.
pub const CARDINAL_COST: u32 = 1000;
/// Cost of one diagonal step (√2 in fixed point).
pub const DIAGONAL_COST: u32 = 1414;

/// When a diagonal step may pass between two orthogonal neighbours.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum CornerPolicy {
    /// Diagonal disallowed if either orthogonal neighbour is blocked.
    #[default]
    Never,
    /// Diagonal disallowed only when both orthogonal neighbours are blocked.
    NoSqueeze,
    Always,
}

impl CornerPolicy {
    pub fn permits(self, first_open: bool, second_open: bool) -> bool {
        match self {
            Self::Never => first_open && second_open,
            Self::NoSqueeze => first_open || second_open,
            Self::Always => true,
        }
    }
}

/// What to do when the start or goal cell is blocked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BlockedEndpoint {
    #[default]
    Fail,
    /// Substitute the nearest walkable cell.
    Nearest,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PathOptions {
    pub allow_diagonal: bool,
    pub corner_policy: CornerPolicy,
    pub blocked_endpoint: BlockedEndpoint,
    /// Upper bound on expanded nodes per search. `None` searches exhaustively.
    pub max_expansions: Option<u32>,
}

impl PathOptions {
    /// Four-way movement with default endpoint handling.
    pub fn cardinal() -> Self {
        Self {
            allow_diagonal: false,
            ..Self::default()
        }
    }

    pub fn with_blocked_endpoint(mut self, blocked_endpoint: BlockedEndpoint) -> Self {
        self.blocked_endpoint = blocked_endpoint;
        self
    }

    pub fn with_corner_policy(mut self, corner_policy: CornerPolicy) -> Self {
        self.corner_policy = corner_policy;
        self
    }

    pub fn with_max_expansions(mut self, max_expansions: Option<u32>) -> Self {
        self.max_expansions = max_expansions;
        self
    }
}

impl Default for PathOptions {
    fn default() -> Self {
        Self {
            allow_diagonal: true,
            corner_policy: CornerPolicy::Never,
            blocked_endpoint: BlockedEndpoint::Fail,
            max_expansions: Some(10_000),
        }
    }
}

/// Ordered tiles to walk, excluding the requester's own cell and ending at
/// the goal. Empty means there is nothing to follow.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Path {
    steps: Vec<TileCoord>,
}

impl Path {
    pub fn new(steps: Vec<TileCoord>) -> Self {
        Self { steps }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn get(&self, index: usize) -> Option<TileCoord> {
        self.steps.get(index).copied()
    }

    pub fn first(&self) -> Option<TileCoord> {
        self.steps.first().copied()
    }

    pub fn goal(&self) -> Option<TileCoord> {
        self.steps.last().copied()
    }

    pub fn steps(&self) -> &[TileCoord] {
        &self.steps
    }

    pub fn iter(&self) -> slice::Iter<'_, TileCoord> {
        self.steps.iter()
    }

    /// Total fixed-point cost of walking the path from `start`.
    pub fn cost_from(&self, start: TileCoord) -> u32 {
        let mut previous = start;
        let mut total = 0;
        for step in &self.steps {
            let diagonal = step.col != previous.col && step.row != previous.row;
            total += if diagonal { DIAGONAL_COST } else { CARDINAL_COST };
            previous = *step;
        }
        total
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a TileCoord;
    type IntoIter = slice::Iter<'a, TileCoord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Reason a search produced no path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("goal {goal} is not reachable from {start}")]
    Unreachable { start: TileCoord, goal: TileCoord },

    #[error("start tile {0} is blocked")]
    BlockedStart(TileCoord),

    #[error("goal tile {0} is blocked")]
    BlockedGoal(TileCoord),

    #[error("search budget of {limit} expansions exhausted")]
    BudgetExhausted { limit: u32 },
}

impl GameError for PathError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Unreachable { .. } | Self::BudgetExhausted { .. } => ErrorSeverity::Recoverable,
            Self::BlockedStart(_) | Self::BlockedGoal(_) => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Unreachable { .. } => "PATH_UNREACHABLE",
            Self::BlockedStart(_) => "PATH_BLOCKED_START",
            Self::BlockedGoal(_) => "PATH_BLOCKED_GOAL",
            Self::BudgetExhausted { .. } => "PATH_BUDGET_EXHAUSTED",
        }
    }
}
