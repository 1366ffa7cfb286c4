//! Run a single path search against a level's navigation grid.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use serde_json::json;

use survivor_core::{BlockedEndpoint, CornerPolicy, PathOptions, TileCoord, plan};

use crate::utils::{self, OutputFormat};

/// Plan a path between two tiles
#[derive(Parser)]
pub struct Plan {
    /// Level name under `<data-dir>/levels/`
    #[arg(value_name = "LEVEL")]
    level: String,

    /// Start tile as COL,ROW (defaults to the level's enemy start)
    #[arg(long, value_name = "COL,ROW", value_parser = utils::parse_tile)]
    from: Option<TileCoord>,

    /// Goal tile as COL,ROW (defaults to the level's player start)
    #[arg(long, value_name = "COL,ROW", value_parser = utils::parse_tile)]
    to: Option<TileCoord>,

    /// Only move in the four cardinal directions
    #[arg(long)]
    cardinal: bool,

    /// Diagonal corner rule: never, no_squeeze or always
    #[arg(long, default_value = "never", value_parser = utils::parse_corner_policy)]
    corner_policy: CornerPolicy,

    /// Substitute the nearest walkable tile for a blocked start or goal
    #[arg(long)]
    nearest: bool,

    /// Node expansion budget (0 disables the limit)
    #[arg(long, default_value_t = 10_000)]
    max_expansions: u32,

    /// Custom data directory (defaults to the bundled content)
    #[arg(short, long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "summary")]
    format: OutputFormat,
}

impl Plan {
    pub fn execute(self) -> Result<()> {
        let level = utils::content_factory(self.data_dir)
            .load_level(&self.level)
            .with_context(|| format!("Failed to load level `{}`", self.level))?;

        let start = self.from.unwrap_or(level.enemy_start);
        let goal = self.to.unwrap_or(level.player_start);

        let base = if self.cardinal {
            PathOptions::cardinal()
        } else {
            PathOptions::default()
        };
        let options = base
            .with_corner_policy(self.corner_policy)
            .with_blocked_endpoint(if self.nearest {
                BlockedEndpoint::Nearest
            } else {
                BlockedEndpoint::Fail
            })
            .with_max_expansions((self.max_expansions > 0).then_some(self.max_expansions));

        let result = plan(&level.grid, start, goal, &options);

        match self.format {
            OutputFormat::Json => {
                let value = match &result {
                    Ok(path) => json!({
                        "start": start,
                        "goal": goal,
                        "steps": path.steps(),
                        "cost": path.cost_from(start),
                    }),
                    Err(err) => json!({
                        "start": start,
                        "goal": goal,
                        "error": err.to_string(),
                    }),
                };
                println!("{}", serde_json::to_string_pretty(&value)?);
            }
            OutputFormat::Summary => {
                println!(
                    "{} {} -> {} on {}",
                    style("Plan:").bold().cyan(),
                    start,
                    goal,
                    level.name
                );
                match &result {
                    Ok(path) => {
                        println!(
                            "{} {} steps, cost {}",
                            style("Path:").bold().green(),
                            path.len(),
                            path.cost_from(start)
                        );
                        let mut marks: BTreeMap<TileCoord, char> =
                            path.iter().map(|tile| (*tile, '*')).collect();
                        marks.insert(start, 'S');
                        marks.insert(goal, 'G');
                        println!();
                        print!("{}", utils::render_grid(&level.grid, &marks));
                    }
                    Err(err) => println!("{} {}", style("No path:").bold().red(), err),
                }
            }
        }
        Ok(())
    }
}
