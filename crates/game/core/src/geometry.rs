//! Tile and world coordinate types shared by every navigation component.
//!
//! Tiles are addressed as `(col, row)` on a uniform grid. World positions are
//! pixel-space floats with `y` growing downward (screen convention), so
//! [`Direction::Down`] means increasing `y`.
use std::fmt;

/// Discrete grid position expressed in tile coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileCoord {
    pub col: i32,
    pub row: i32,
}

impl TileCoord {
    pub const ORIGIN: Self = Self { col: 0, row: 0 };

    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    /// Returns the tile displaced by `(dc, dr)`.
    pub const fn offset(self, dc: i32, dr: i32) -> Self {
        Self {
            col: self.col + dc,
            row: self.row + dr,
        }
    }

    pub fn step(self, direction: Direction) -> Self {
        let (dc, dr) = direction.delta();
        self.offset(dc, dr)
    }

    pub fn manhattan(self, other: Self) -> u32 {
        self.col.abs_diff(other.col) + self.row.abs_diff(other.row)
    }

    /// True when `other` is one orthogonal or diagonal step away.
    pub fn is_adjacent(self, other: Self) -> bool {
        let dc = self.col.abs_diff(other.col);
        let dr = self.row.abs_diff(other.row);
        dc <= 1 && dr <= 1 && (dc + dr) > 0
    }
}

impl Default for TileCoord {
    fn default() -> Self {
        Self::ORIGIN
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}

/// Continuous world-space position in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldPos {
    pub x: f32,
    pub y: f32,
}

impl WorldPos {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Self) -> f32 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Moves toward `target` by at most `max_step`, landing exactly on it when
    /// the remaining distance is shorter than the step.
    pub fn step_toward(self, target: Self, max_step: f32) -> Self {
        let dx = target.x - self.x;
        let dy = target.y - self.y;
        let remaining = dx.hypot(dy);
        if remaining <= max_step || remaining == 0.0 {
            return target;
        }
        let scale = max_step / remaining;
        Self::new(self.x + dx * scale, self.y + dy * scale)
    }
}

impl fmt::Display for WorldPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}

/// Placement of the tile grid in world space.
///
/// `origin` is the world position of the top-left corner of tile `(0, 0)`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MapFrame {
    pub origin: WorldPos,
    pub cell_size: f32,
}

impl MapFrame {
    pub const fn new(origin: WorldPos, cell_size: f32) -> Self {
        Self { origin, cell_size }
    }

    pub fn half_cell(&self) -> f32 {
        self.cell_size * 0.5
    }

    /// World position of the center of `tile`.
    pub fn tile_center(&self, tile: TileCoord) -> WorldPos {
        WorldPos::new(
            self.origin.x + tile.col as f32 * self.cell_size + self.half_cell(),
            self.origin.y + tile.row as f32 * self.cell_size + self.half_cell(),
        )
    }

    /// Tile containing `pos`. Positions left of / above the origin map to
    /// negative tiles.
    pub fn tile_at(&self, pos: WorldPos) -> TileCoord {
        TileCoord::new(
            ((pos.x - self.origin.x) / self.cell_size).floor() as i32,
            ((pos.y - self.origin.y) / self.cell_size).floor() as i32,
        )
    }
}

impl Default for MapFrame {
    fn default() -> Self {
        Self::new(WorldPos::ZERO, 32.0)
    }
}

/// Screen-space direction used for movement headings and facing.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::EnumIter, strum::Display, strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }

    pub fn reverse(self) -> Self {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    /// The two directions perpendicular to this one.
    pub fn turns(self) -> [Direction; 2] {
        if self.is_horizontal() {
            [Direction::Up, Direction::Down]
        } else {
            [Direction::Left, Direction::Right]
        }
    }

    /// Direction of the dominant axis of `(dx, dy)`.
    ///
    /// Horizontal wins only when strictly larger; ties resolve vertically.
    /// Returns `None` for a zero displacement.
    pub fn dominant(dx: f32, dy: f32) -> Option<Self> {
        if dx == 0.0 && dy == 0.0 {
            return None;
        }
        if dx.abs() > dy.abs() {
            Some(if dx > 0.0 {
                Direction::Right
            } else {
                Direction::Left
            })
        } else if dy > 0.0 {
            Some(Direction::Down)
        } else {
            Some(Direction::Up)
        }
    }
}

/// Per-tick facing reported to the animation layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Facing {
    Moving(Direction),
    #[default]
    Stopped,
}

impl Facing {
    pub fn from_displacement(dx: f32, dy: f32) -> Self {
        Direction::dominant(dx, dy).map_or(Facing::Stopped, Facing::Moving)
    }

    pub fn direction(self) -> Option<Direction> {
        match self {
            Facing::Moving(direction) => Some(direction),
            Facing::Stopped => None,
        }
    }

    pub fn is_stopped(self) -> bool {
        matches!(self, Facing::Stopped)
    }
}

/// Position and facing proposed for an agent on one tick.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Motion {
    pub position: WorldPos,
    pub facing: Facing,
    /// Set when a chasing agent has no path to follow this tick.
    pub no_path: bool,
}

impl Motion {
    /// Motion from `from` to `to`, facing the dominant axis of the move.
    pub fn between(from: WorldPos, to: WorldPos) -> Self {
        Self {
            position: to,
            facing: Facing::from_displacement(to.x - from.x, to.y - from.y),
            no_path: false,
        }
    }

    pub fn hold(position: WorldPos) -> Self {
        Self {
            position,
            facing: Facing::Stopped,
            no_path: false,
        }
    }

    pub fn with_no_path(mut self) -> Self {
        self.no_path = true;
        self
    }

    pub fn displacement_from(&self, from: WorldPos) -> f32 {
        from.distance(self.position)
    }
}
