use std::collections::VecDeque;

use bitflags::bitflags;

use super::layer::{CollisionLayer, MapDimensions};
use crate::error::NavError;
use crate::geometry::{Direction, TileCoord};

bitflags! {
    /// Walkable orthogonal neighbours of a tile.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct Neighbors: u8 {
        const LEFT  = 1 << 0;
        const RIGHT = 1 << 1;
        const UP    = 1 << 2;
        const DOWN  = 1 << 3;
    }
}

impl Neighbors {
    pub fn from_direction(direction: Direction) -> Self {
        match direction {
            Direction::Left => Self::LEFT,
            Direction::Right => Self::RIGHT,
            Direction::Up => Self::UP,
            Direction::Down => Self::DOWN,
        }
    }

    pub fn allows(self, direction: Direction) -> bool {
        self.contains(Self::from_direction(direction))
    }
}

/// Boolean walkability matrix for one map.
///
/// Cells outside the bounds are implicitly blocked. The grid is immutable
/// between rebuilds apart from explicit [`NavGrid::set_walkable`] patches.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavGrid {
    dimensions: MapDimensions,
    blocked: Vec<bool>,
}

impl NavGrid {
    /// Builds a grid where a cell is blocked iff any layer collides there.
    ///
    /// With no layers every cell is walkable.
    pub fn build<L: CollisionLayer>(
        layers: &[L],
        width: u32,
        height: u32,
    ) -> Result<Self, NavError> {
        let mut grid = Self::open(width, height)?;

        for layer in layers {
            let actual = layer.dimensions();
            if actual != grid.dimensions {
                return Err(NavError::LayerSizeMismatch {
                    layer: layer.name().to_owned(),
                    expected_width: width,
                    expected_height: height,
                    actual_width: actual.width,
                    actual_height: actual.height,
                });
            }

            for (index, blocked) in grid.blocked.iter_mut().enumerate() {
                if !*blocked && layer.collides(grid.dimensions.tile_of(index)) {
                    *blocked = true;
                }
            }
        }

        tracing::debug!(
            width,
            height,
            layers = layers.len(),
            blocked = grid.blocked_count(),
            "built navigation grid"
        );
        Ok(grid)
    }

    /// Fully walkable grid.
    pub fn open(width: u32, height: u32) -> Result<Self, NavError> {
        if width == 0 || height == 0 {
            return Err(NavError::EmptyGrid { width, height });
        }
        let dimensions = MapDimensions::new(width, height);
        Ok(Self {
            dimensions,
            blocked: vec![false; dimensions.area()],
        })
    }

    /// Parses a grid drawn with `#` for blocked cells and any other character
    /// for walkable ones. Blank lines are skipped.
    pub fn from_ascii(art: &str) -> Result<Self, NavError> {
        let rows: Vec<&str> = art
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        let width = rows.first().map_or(0, |row| row.chars().count());
        let mut grid = Self::open(width as u32, rows.len() as u32)?;

        for (row, line) in rows.iter().enumerate() {
            let actual = line.chars().count();
            if actual != width {
                return Err(NavError::RaggedRow {
                    row,
                    expected: width,
                    actual,
                });
            }
            for (col, ch) in line.chars().enumerate() {
                if ch == '#' {
                    grid.set_walkable(TileCoord::new(col as i32, row as i32), false);
                }
            }
        }
        Ok(grid)
    }

    pub fn dimensions(&self) -> MapDimensions {
        self.dimensions
    }

    pub fn width(&self) -> u32 {
        self.dimensions.width
    }

    pub fn height(&self) -> u32 {
        self.dimensions.height
    }

    pub fn contains(&self, tile: TileCoord) -> bool {
        self.dimensions.contains(tile)
    }

    pub fn is_walkable(&self, tile: TileCoord) -> bool {
        self.dimensions
            .index_of(tile)
            .is_some_and(|index| !self.blocked[index])
    }

    /// Patches a single cell. Out-of-bounds tiles are ignored.
    pub fn set_walkable(&mut self, tile: TileCoord, walkable: bool) {
        if let Some(index) = self.dimensions.index_of(tile) {
            self.blocked[index] = !walkable;
        }
    }

    /// Nearest in-bounds tile.
    pub fn clamp(&self, tile: TileCoord) -> TileCoord {
        TileCoord::new(
            tile.col.clamp(0, self.dimensions.width as i32 - 1),
            tile.row.clamp(0, self.dimensions.height as i32 - 1),
        )
    }

    pub fn blocked_count(&self) -> usize {
        self.blocked.iter().filter(|blocked| **blocked).count()
    }

    pub fn open_neighbors(&self, tile: TileCoord) -> Neighbors {
        Direction::ALL
            .into_iter()
            .filter(|direction| self.is_walkable(tile.step(*direction)))
            .fold(Neighbors::empty(), |mask, direction| {
                mask | Neighbors::from_direction(direction)
            })
    }

    /// Closest walkable tile to `tile` (after clamping), searching outward in
    /// breadth-first rings. Returns `None` when the grid has no walkable cell.
    pub fn nearest_walkable(&self, tile: TileCoord) -> Option<TileCoord> {
        let start = self.clamp(tile);
        if self.is_walkable(start) {
            return Some(start);
        }

        let mut visited = vec![false; self.dimensions.area()];
        let mut queue = VecDeque::new();
        if let Some(index) = self.dimensions.index_of(start) {
            visited[index] = true;
            queue.push_back(start);
        }

        while let Some(current) = queue.pop_front() {
            for direction in Direction::ALL {
                let next = current.step(direction);
                let Some(index) = self.dimensions.index_of(next) else {
                    continue;
                };
                if visited[index] {
                    continue;
                }
                if !self.blocked[index] {
                    return Some(next);
                }
                visited[index] = true;
                queue.push_back(next);
            }
        }
        None
    }

    /// Renders the grid with `#` for blocked and `.` for walkable cells.
    pub fn to_ascii(&self) -> String {
        let width = self.dimensions.width as usize;
        let mut out = String::with_capacity(self.blocked.len() + self.dimensions.height as usize);
        for row in self.blocked.chunks(width) {
            out.extend(row.iter().map(|blocked| if *blocked { '#' } else { '.' }));
            out.push('\n');
        }
        out
    }
}

impl<T: CollisionLayer + ?Sized> CollisionLayer for &T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn dimensions(&self) -> MapDimensions {
        (**self).dimensions()
    }

    fn collides(&self, tile: TileCoord) -> bool {
        (**self).collides(tile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nav::layer::{CollisionRule, TileLayer};

    fn layer(name: &str, width: u32, height: u32, walls: &[(i32, i32)]) -> TileLayer {
        let dims = MapDimensions::new(width, height);
        let mut layer = TileLayer::empty(name, dims, CollisionRule::ids([1]));
        for (col, row) in walls {
            layer.set_tile(TileCoord::new(*col, *row), 1);
        }
        layer
    }

    #[test]
    fn build_unions_all_layers() {
        let a = layer("ground", 4, 3, &[(0, 0)]);
        let b = layer("buildings", 4, 3, &[(3, 2)]);

        let grid = NavGrid::build(&[a, b], 4, 3).unwrap();

        assert!(!grid.is_walkable(TileCoord::new(0, 0)));
        assert!(!grid.is_walkable(TileCoord::new(3, 2)));
        assert!(grid.is_walkable(TileCoord::new(1, 1)));
        assert_eq!(grid.blocked_count(), 2);
    }

    #[test]
    fn zero_layers_is_fully_walkable() {
        let grid = NavGrid::build::<TileLayer>(&[], 5, 5).unwrap();
        assert_eq!(grid.blocked_count(), 0);
    }

    #[test]
    fn mismatched_layer_is_rejected() {
        let small = layer("walls", 2, 2, &[]);
        let err = NavGrid::build(&[small], 4, 3).unwrap_err();
        assert!(matches!(err, NavError::LayerSizeMismatch { .. }));
    }

    #[test]
    fn out_of_bounds_is_blocked() {
        let grid = NavGrid::open(3, 3).unwrap();
        assert!(!grid.is_walkable(TileCoord::new(-1, 0)));
        assert!(!grid.is_walkable(TileCoord::new(0, 3)));
        assert_eq!(grid.clamp(TileCoord::new(-4, 9)), TileCoord::new(0, 2));
    }

    #[test]
    fn open_neighbors_reports_walkable_sides() {
        let grid = NavGrid::from_ascii(
            "
            .#.
            ...
            .#.
            ",
        )
        .unwrap();
        let mask = grid.open_neighbors(TileCoord::new(1, 1));
        assert_eq!(mask, Neighbors::LEFT | Neighbors::RIGHT);
        assert!(!mask.allows(Direction::Up));
    }

    #[test]
    fn nearest_walkable_searches_outward() {
        let grid = NavGrid::from_ascii(
            "
            ###
            ###
            ##.
            ",
        )
        .unwrap();
        assert_eq!(
            grid.nearest_walkable(TileCoord::new(0, 0)),
            Some(TileCoord::new(2, 2))
        );

        let solid = NavGrid::from_ascii("##\n##").unwrap();
        assert_eq!(solid.nearest_walkable(TileCoord::new(0, 0)), None);
    }

    #[test]
    fn ascii_round_trips() {
        let art = ".#.\n...\n";
        let grid = NavGrid::from_ascii(art).unwrap();
        assert_eq!(grid.to_ascii(), art);
    }

    #[test]
    fn ragged_ascii_is_rejected() {
        let err = NavGrid::from_ascii("...\n..").unwrap_err();
        assert_eq!(
            err,
            NavError::RaggedRow {
                row: 1,
                expected: 3,
                actual: 2
            }
        );
    }
}
