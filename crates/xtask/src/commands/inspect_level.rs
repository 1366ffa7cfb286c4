//! Print a level's navigation grid and metadata.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use serde_json::json;

use survivor_content::LoadedLevel;

use crate::utils::{self, OutputFormat};

/// Inspect a level file
#[derive(Parser)]
pub struct InspectLevel {
    /// Level name under `<data-dir>/levels/`. Lists every level when omitted.
    #[arg(value_name = "LEVEL")]
    level: Option<String>,

    /// Custom data directory (defaults to the bundled content)
    #[arg(short, long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "summary")]
    format: OutputFormat,
}

impl InspectLevel {
    pub fn execute(self) -> Result<()> {
        let factory = utils::content_factory(self.data_dir);

        let Some(name) = self.level else {
            let names = factory.level_names()?;
            match self.format {
                OutputFormat::Summary => {
                    println!("{}", style("Levels:").bold().cyan());
                    for name in names {
                        println!("  {name}");
                    }
                }
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&names)?),
            }
            return Ok(());
        };

        let level = factory
            .load_level(&name)
            .with_context(|| format!("Failed to load level `{name}`"))?;

        match self.format {
            OutputFormat::Summary => print_summary(&level),
            OutputFormat::Json => print_json(&level)?,
        }
        Ok(())
    }
}

fn print_summary(level: &LoadedLevel) {
    let grid = &level.grid;
    println!("{} {}", style("Level:").bold().cyan(), level.name);
    println!(
        "{} {}x{} ({} cells, {} blocked)",
        style("Size:").bold().cyan(),
        grid.width(),
        grid.height(),
        level.dimensions.area(),
        grid.blocked_count()
    );
    println!(
        "{} {}",
        style("Cell size:").bold().cyan(),
        level.frame.cell_size
    );
    println!(
        "{} player {} / enemy {}",
        style("Starts:").bold().cyan(),
        level.player_start,
        level.enemy_start
    );
    if let Some((min, max)) = level.population {
        println!("{} {min}..={max} enemies", style("Population:").bold().cyan());
    }
    println!();

    println!("{}", style("Layers:").bold().yellow());
    for layer in &level.layers {
        println!("  {} ({:?})", layer.name, layer.rule);
    }
    println!();

    println!("{}", style("Doors:").bold().yellow());
    if level.doors.is_empty() {
        println!("  none");
    }
    for door in &level.doors {
        println!("  {door}");
    }
    println!();

    let mut marks = BTreeMap::new();
    for door in &level.doors {
        marks.insert(*door, 'D');
    }
    marks.insert(level.player_start, 'P');
    marks.insert(level.enemy_start, 'E');

    println!("{}", style("Grid:").bold().yellow());
    print!("{}", utils::render_grid(grid, &marks));
}

fn print_json(level: &LoadedLevel) -> Result<()> {
    let rows: Vec<String> = level.grid.to_ascii().lines().map(str::to_owned).collect();
    let value = json!({
        "name": level.name,
        "width": level.grid.width(),
        "height": level.grid.height(),
        "cell_size": level.frame.cell_size,
        "blocked": level.grid.blocked_count(),
        "player_start": level.player_start,
        "enemy_start": level.enemy_start,
        "doors": level.doors,
        "population": level.population,
        "grid": rows,
    });
    println!(
        "{}",
        serde_json::to_string_pretty(&value).context("Failed to serialize level")?
    );
    Ok(())
}
