use std::collections::BTreeSet;

use crate::geometry::TileCoord;

/// Tile index used by map editors for "no tile here".
pub const EMPTY_TILE: i32 = -1;

/// Width and height of a tile grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MapDimensions {
    pub width: u32,
    pub height: u32,
}

impl MapDimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn contains(&self, tile: TileCoord) -> bool {
        tile.col >= 0
            && tile.row >= 0
            && tile.col < self.width as i32
            && tile.row < self.height as i32
    }

    pub fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Row-major index of `tile`, or `None` when out of bounds.
    pub fn index_of(&self, tile: TileCoord) -> Option<usize> {
        self.contains(tile)
            .then(|| tile.row as usize * self.width as usize + tile.col as usize)
    }

    pub fn tile_of(&self, index: usize) -> TileCoord {
        let width = self.width as usize;
        TileCoord::new((index % width) as i32, (index / width) as i32)
    }
}

/// Source of per-tile collision information for building a [`super::NavGrid`].
pub trait CollisionLayer {
    /// Name used in diagnostics.
    fn name(&self) -> &str;

    fn dimensions(&self) -> MapDimensions;

    /// True when the tile at `tile` blocks movement.
    fn collides(&self, tile: TileCoord) -> bool;
}

/// How a [`TileLayer`] decides which tile indices collide.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CollisionRule {
    /// Decorative layer.
    #[default]
    None,
    /// Only the listed tile indices collide.
    Ids(BTreeSet<i32>),
    /// Every present tile collides except the listed indices.
    Exclude(BTreeSet<i32>),
}

impl CollisionRule {
    pub fn ids(ids: impl IntoIterator<Item = i32>) -> Self {
        Self::Ids(ids.into_iter().collect())
    }

    pub fn exclude(ids: impl IntoIterator<Item = i32>) -> Self {
        Self::Exclude(ids.into_iter().collect())
    }

    pub fn collides(&self, index: i32) -> bool {
        if index == EMPTY_TILE {
            return false;
        }
        match self {
            Self::None => false,
            Self::Ids(ids) => ids.contains(&index),
            Self::Exclude(ids) => !ids.contains(&index),
        }
    }
}

/// Row-major tile-index layer with a collision rule.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileLayer {
    pub name: String,
    pub dimensions: MapDimensions,
    pub tiles: Vec<i32>,
    pub rule: CollisionRule,
}

impl TileLayer {
    pub fn new(
        name: impl Into<String>,
        dimensions: MapDimensions,
        tiles: Vec<i32>,
        rule: CollisionRule,
    ) -> Self {
        Self {
            name: name.into(),
            dimensions,
            tiles,
            rule,
        }
    }

    /// A layer of `dimensions` filled with [`EMPTY_TILE`].
    pub fn empty(name: impl Into<String>, dimensions: MapDimensions, rule: CollisionRule) -> Self {
        Self::new(name, dimensions, vec![EMPTY_TILE; dimensions.area()], rule)
    }

    pub fn tile(&self, tile: TileCoord) -> Option<i32> {
        self.dimensions
            .index_of(tile)
            .and_then(|index| self.tiles.get(index).copied())
    }

    pub fn set_tile(&mut self, tile: TileCoord, index: i32) {
        if let Some(slot) = self
            .dimensions
            .index_of(tile)
            .and_then(|i| self.tiles.get_mut(i))
        {
            *slot = index;
        }
    }

    /// True when the stored tile vector matches the declared dimensions.
    pub fn is_consistent(&self) -> bool {
        self.tiles.len() == self.dimensions.area()
    }
}

impl CollisionLayer for TileLayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn dimensions(&self) -> MapDimensions {
        self.dimensions
    }

    fn collides(&self, tile: TileCoord) -> bool {
        self.tile(tile).is_some_and(|index| self.rule.collides(index))
    }
}
