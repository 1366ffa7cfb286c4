//! Tile-aligned random walk used while an agent is not chasing.
//!
//! The agent walks from tile center to tile center. On each arrival it looks
//! at the straight, left-turn and right-turn cells relative to its heading and
//! picks one, weighting straight ahead more heavily. It never reverses. Walking
//! off the left or right edge of the map re-enters from the opposite edge.
use arrayvec::ArrayVec;

use crate::geometry::{Direction, MapFrame, Motion, TileCoord, WorldPos};
use crate::nav::NavGrid;
use crate::rng::{PcgRng, RngOracle, SeedContext, compute_seed};

/// Upper bound on weighted candidates: straight weight plus two turns.
const MAX_CANDIDATES: usize = 16;

#[derive(Clone, Debug)]
pub struct WanderController {
    agent_id: u32,
    world_seed: u64,
    heading: Direction,
    target: Option<WorldPos>,
    decisions: u64,
    straight_weight: u32,
    step_distance: f32,
    rng: PcgRng,
}

impl WanderController {
    /// Creates a walker heading randomly left or right.
    pub fn new(agent_id: u32, world_seed: u64, straight_weight: u32, step_distance: f32) -> Self {
        let rng = PcgRng;
        let seed = compute_seed(world_seed, 0, agent_id, SeedContext::InitialHeading);
        let heading = if rng.coin(seed) {
            Direction::Right
        } else {
            Direction::Left
        };
        Self {
            agent_id,
            world_seed,
            heading,
            target: None,
            decisions: 0,
            straight_weight: straight_weight.clamp(1, (MAX_CANDIDATES - 2) as u32),
            step_distance,
            rng,
        }
    }

    pub fn heading(&self) -> Direction {
        self.heading
    }

    pub fn with_heading(mut self, heading: Direction) -> Self {
        self.heading = heading;
        self
    }

    pub fn target(&self) -> Option<WorldPos> {
        self.target
    }

    /// Forgets the current target; the next step re-centers on the agent's
    /// tile before choosing a direction again.
    pub fn reset(&mut self) {
        self.target = None;
    }

    /// Advances one tick from `position`.
    pub fn step(&mut self, position: WorldPos, grid: &NavGrid, frame: &MapFrame) -> Motion {
        let target = *self
            .target
            .get_or_insert_with(|| frame.tile_center(frame.tile_at(position)));

        let target = if position == target {
            match self.choose_next(frame.tile_at(position), grid) {
                Some(next) => {
                    let center = frame.tile_center(next);
                    self.target = Some(center);
                    center
                }
                None => return Motion::hold(position),
            }
        } else {
            target
        };

        let mut next = position.step_toward(target, self.step_distance);
        let motion = Motion::between(position, next);

        if let Some(wrapped) = self.wrap(next, grid, frame) {
            next = wrapped;
        }
        Motion {
            position: next,
            ..motion
        }
    }

    fn choose_next(&mut self, tile: TileCoord, grid: &NavGrid) -> Option<TileCoord> {
        let mut candidates: ArrayVec<Direction, MAX_CANDIDATES> = ArrayVec::new();

        if self.is_open(tile.step(self.heading), grid) {
            for _ in 0..self.straight_weight {
                candidates.push(self.heading);
            }
        }
        for turn in self.heading.turns() {
            if self.is_open(tile.step(turn), grid) {
                candidates.push(turn);
            }
        }

        if candidates.is_empty() {
            tracing::trace!(agent = self.agent_id, %tile, "wander has no open direction");
            return None;
        }

        self.decisions += 1;
        let seed = compute_seed(
            self.world_seed,
            self.decisions,
            self.agent_id,
            SeedContext::WanderTurn,
        );
        let heading = candidates[self.rng.pick(seed, candidates.len())];
        self.heading = heading;
        Some(tile.step(heading))
    }

    /// Off-grid horizontal cells count as open when their wrapped counterpart is.
    fn is_open(&self, tile: TileCoord, grid: &NavGrid) -> bool {
        if grid.is_walkable(tile) {
            return true;
        }
        let in_rows = tile.row >= 0 && tile.row < grid.height() as i32;
        let off_side = tile.col < 0 || tile.col >= grid.width() as i32;
        in_rows && off_side && grid.is_walkable(wrap_column(tile, grid.width()))
    }

    /// Relocates a position that crossed the left or right map edge.
    fn wrap(&mut self, position: WorldPos, grid: &NavGrid, frame: &MapFrame) -> Option<WorldPos> {
        let left = frame.origin.x;
        let right = frame.origin.x + grid.width() as f32 * frame.cell_size;
        let row = frame.tile_at(position).row;

        let (wrapped, col) = if position.x < left {
            (WorldPos::new(right, position.y), grid.width() as i32 - 1)
        } else if position.x > right {
            (WorldPos::new(left, position.y), 0)
        } else {
            return None;
        };

        self.target = Some(frame.tile_center(TileCoord::new(col, row)));
        tracing::trace!(agent = self.agent_id, from = %position, to = %wrapped, "wander wrapped");
        Some(wrapped)
    }
}

fn wrap_column(tile: TileCoord, width: u32) -> TileCoord {
    TileCoord::new(tile.col.rem_euclid(width as i32), tile.row)
}
