//! Data-driven level and tuning content.
//!
//! This crate provides loaders for RON/TOML data files:
//! - Levels: map size and placement, tile layers with collision rules, door
//!   markers and start tiles (RON)
//! - Pursuit tuning (TOML)
//!
//! All loaders produce survivor-core types directly.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{ConfigLoader, ContentFactory, LevelLoader, LoadResult, LoadedLevel};
