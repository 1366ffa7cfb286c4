//! Walkability model built from tile-collision layers.
mod grid;
mod layer;

pub use grid::{NavGrid, Neighbors};
pub use layer::{CollisionLayer, CollisionRule, EMPTY_TILE, MapDimensions, TileLayer};
