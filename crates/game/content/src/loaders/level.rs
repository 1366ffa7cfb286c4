//! Level loader.
//!
//! A level file describes the map size and placement, the tile layers with
//! their collision rules, and the start tiles. An optional marker layer flags
//! door cells: those tiles become door spawn points and are erased from the
//! layer before the navigation grid is built.

use std::path::Path;

use serde::{Deserialize, Serialize};
use survivor_core::nav::EMPTY_TILE;
use survivor_core::{
    CollisionRule, MapDimensions, MapFrame, NavGrid, TileCoord, TileLayer, WorldPos,
};

use crate::loaders::{LoadResult, read_file};

/// Marker index meaning "no door here" on the marker layer.
const NO_MARKER: i32 = 0;

/// Level data structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct LevelDataRon {
    name: String,
    dimensions: (u32, u32),
    #[serde(default = "default_cell_size")]
    cell_size: f32,
    #[serde(default)]
    origin: (f32, f32),
    player_start: (i32, i32),
    enemy_start: (i32, i32),
    layers: Vec<LayerRon>,
    #[serde(default)]
    marker_layer: Option<String>,
    #[serde(default)]
    population: Option<(u32, u32)>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LayerRon {
    name: String,
    #[serde(default)]
    collision: CollisionRon,
    tiles: TilesRon,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
enum CollisionRon {
    #[default]
    None,
    Ids(Vec<i32>),
    Exclude(Vec<i32>),
}

/// Tile indices, either flat row-major or one whitespace-separated string per
/// row where `.` stands for an empty cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
enum TilesRon {
    Indices(Vec<i32>),
    Rows(Vec<String>),
}

fn default_cell_size() -> f32 {
    32.0
}

/// Fully resolved level, ready to install into a level context.
#[derive(Debug, Clone)]
pub struct LoadedLevel {
    pub name: String,
    pub dimensions: MapDimensions,
    pub frame: MapFrame,
    pub layers: Vec<TileLayer>,
    pub doors: Vec<TileCoord>,
    pub grid: NavGrid,
    pub player_start: TileCoord,
    pub enemy_start: TileCoord,
    /// Inclusive range of enemies placed when the level is entered.
    pub population: Option<(u32, u32)>,
}

/// Loader for levels from RON files.
pub struct LevelLoader;

impl LevelLoader {
    pub fn load(path: &Path) -> LoadResult<LoadedLevel> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Failed to load level {}: {}", path.display(), e))
    }

    pub fn parse(content: &str) -> LoadResult<LoadedLevel> {
        let data: LevelDataRon = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse level RON: {}", e))?;

        let (width, height) = data.dimensions;
        let dimensions = MapDimensions::new(width, height);
        if data.cell_size <= 0.0 {
            anyhow::bail!("cell_size must be positive, got {}", data.cell_size);
        }
        let frame = MapFrame::new(WorldPos::new(data.origin.0, data.origin.1), data.cell_size);

        let mut layers = data
            .layers
            .into_iter()
            .map(|layer| resolve_layer(layer, dimensions))
            .collect::<LoadResult<Vec<_>>>()?;

        let doors = match &data.marker_layer {
            Some(marker) => {
                let layer = layers
                    .iter_mut()
                    .find(|layer| &layer.name == marker)
                    .ok_or_else(|| anyhow::anyhow!("marker layer `{}` not found", marker))?;
                extract_doors(layer)
            }
            None => Vec::new(),
        };

        let grid = NavGrid::build(&layers, width, height)?;

        let player_start = start_tile("player_start", data.player_start, dimensions)?;
        let enemy_start = start_tile("enemy_start", data.enemy_start, dimensions)?;
        if let Some((min, max)) = data.population {
            if min > max {
                anyhow::bail!("population range {}..={} is empty", min, max);
            }
        }

        tracing::debug!(
            level = %data.name,
            width,
            height,
            layers = layers.len(),
            doors = doors.len(),
            blocked = grid.blocked_count(),
            "loaded level"
        );

        Ok(LoadedLevel {
            name: data.name,
            dimensions,
            frame,
            layers,
            doors,
            grid,
            player_start,
            enemy_start,
            population: data.population,
        })
    }
}

fn resolve_layer(layer: LayerRon, dimensions: MapDimensions) -> LoadResult<TileLayer> {
    let tiles = match layer.tiles {
        TilesRon::Indices(tiles) => tiles,
        TilesRon::Rows(rows) => parse_rows(&layer.name, &rows, dimensions)?,
    };
    if tiles.len() != dimensions.area() {
        anyhow::bail!(
            "layer `{}` has {} tiles, expected {}x{} = {}",
            layer.name,
            tiles.len(),
            dimensions.width,
            dimensions.height,
            dimensions.area()
        );
    }

    let rule = match layer.collision {
        CollisionRon::None => CollisionRule::None,
        CollisionRon::Ids(ids) => CollisionRule::ids(ids),
        CollisionRon::Exclude(ids) => CollisionRule::exclude(ids),
    };
    Ok(TileLayer::new(layer.name, dimensions, tiles, rule))
}

fn parse_rows(name: &str, rows: &[String], dimensions: MapDimensions) -> LoadResult<Vec<i32>> {
    if rows.len() != dimensions.height as usize {
        anyhow::bail!(
            "layer `{}` has {} rows, expected {}",
            name,
            rows.len(),
            dimensions.height
        );
    }

    let mut tiles = Vec::with_capacity(dimensions.area());
    for (row, line) in rows.iter().enumerate() {
        let before = tiles.len();
        for token in line.split_whitespace() {
            let index = match token {
                "." => EMPTY_TILE,
                other => other.parse::<i32>().map_err(|e| {
                    anyhow::anyhow!("layer `{}` row {}: bad tile `{}`: {}", name, row, other, e)
                })?,
            };
            tiles.push(index);
        }
        let count = tiles.len() - before;
        if count != dimensions.width as usize {
            anyhow::bail!(
                "layer `{}` row {} has {} tiles, expected {}",
                name,
                row,
                count,
                dimensions.width
            );
        }
    }
    Ok(tiles)
}

/// Converts every marked cell into a door and erases it from the layer.
fn extract_doors(layer: &mut TileLayer) -> Vec<TileCoord> {
    let mut doors = Vec::new();
    for (index, tile) in layer.tiles.iter_mut().enumerate() {
        if *tile != NO_MARKER && *tile != EMPTY_TILE {
            *tile = EMPTY_TILE;
            doors.push(layer.dimensions.tile_of(index));
        }
    }
    doors
}

fn start_tile(label: &str, (col, row): (i32, i32), dimensions: MapDimensions) -> LoadResult<TileCoord> {
    let tile = TileCoord::new(col, row);
    if !dimensions.contains(tile) {
        anyhow::bail!(
            "{} {} lies outside the {}x{} map",
            label,
            tile,
            dimensions.width,
            dimensions.height
        );
    }
    Ok(tile)
}
