//! Development tasks for the survivor pursuit crates
//!
//! This binary provides development utilities using the cargo-xtask pattern.
//! Run with: `cargo xtask <command>`

mod commands;
mod utils;

use anyhow::Result;
use clap::Parser;
use commands::{InspectLevel, Plan, Simulate};
use tracing_subscriber::EnvFilter;

/// Development tasks for the survivor pursuit crates
#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Development tools for survivor pathfinding", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Print a level's navigation grid, doors and start tiles
    InspectLevel(InspectLevel),

    /// Run one path search on a level
    Plan(Plan),

    /// Run the tick loop headless and report agent motion
    Simulate(Simulate),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::InspectLevel(cmd) => cmd.execute(),
        Command::Plan(cmd) => cmd.execute(),
        Command::Simulate(cmd) => cmd.execute(),
    }
}
