//! Utility functions for xtask commands

use std::collections::BTreeMap;
use std::path::PathBuf;

use survivor_content::ContentFactory;
use survivor_core::{CornerPolicy, NavGrid, TileCoord};

/// Output format shared by every command.
#[derive(Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary
    Summary,
    /// Full JSON output
    Json,
}

/// Content factory for `data_dir`, or the bundled data when omitted.
pub fn content_factory(data_dir: Option<PathBuf>) -> ContentFactory {
    match data_dir {
        Some(dir) => ContentFactory::new(dir),
        None => ContentFactory::bundled(),
    }
}

/// Parses `col,row` into a tile.
pub fn parse_tile(value: &str) -> Result<TileCoord, String> {
    let (col, row) = value
        .split_once(',')
        .ok_or_else(|| format!("expected COL,ROW, got `{value}`"))?;
    let col = col
        .trim()
        .parse::<i32>()
        .map_err(|e| format!("invalid column `{col}`: {e}"))?;
    let row = row
        .trim()
        .parse::<i32>()
        .map_err(|e| format!("invalid row `{row}`: {e}"))?;
    Ok(TileCoord::new(col, row))
}

pub fn parse_corner_policy(value: &str) -> Result<CornerPolicy, String> {
    value
        .parse::<CornerPolicy>()
        .map_err(|_| format!("unknown corner policy `{value}` (never, no_squeeze, always)"))
}

/// Renders `grid` as ASCII with `marks` drawn over the cells they name.
pub fn render_grid(grid: &NavGrid, marks: &BTreeMap<TileCoord, char>) -> String {
    let mut out = String::new();
    for row in 0..grid.height() as i32 {
        for col in 0..grid.width() as i32 {
            let tile = TileCoord::new(col, row);
            let cell = match marks.get(&tile) {
                Some(mark) => *mark,
                None if grid.is_walkable(tile) => '.',
                None => '#',
            };
            out.push(cell);
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tiles_with_whitespace() {
        assert_eq!(parse_tile("3, 4"), Ok(TileCoord::new(3, 4)));
        assert!(parse_tile("3").is_err());
        assert!(parse_tile("a,1").is_err());
    }

    #[test]
    fn marks_override_cells() {
        let grid = NavGrid::from_ascii("..\n.#").unwrap();
        let marks = BTreeMap::from([(TileCoord::new(0, 0), 'S')]);
        assert_eq!(render_grid(&grid, &marks), "S.\n.#\n");
    }
}
