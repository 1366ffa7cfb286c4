//! Drive the runtime headless for a number of ticks.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;

use survivor_content::LoadedLevel;
use survivor_core::{AgentKind, MapFrame, PursuitConfig, TileCoord};
use survivor_runtime::{Runtime, RuntimeConfig, SimEvent, TickReport};

use crate::utils::{self, OutputFormat};

/// Simulate agents chasing the player start
#[derive(Parser)]
pub struct Simulate {
    /// Level name under `<data-dir>/levels/`
    #[arg(value_name = "LEVEL")]
    level: String,

    /// Number of ticks to run
    #[arg(short, long, default_value_t = 600)]
    ticks: u32,

    /// World seed for wander and spawn decisions
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Enemy spawn tiles as COL,ROW (repeatable)
    #[arg(long = "enemy", value_name = "COL,ROW", value_parser = utils::parse_tile)]
    enemies: Vec<TileCoord>,

    /// NPC spawn tiles as COL,ROW (repeatable)
    #[arg(long = "npc", value_name = "COL,ROW", value_parser = utils::parse_tile)]
    npcs: Vec<TileCoord>,

    /// Spawn enemies at the level's enemy start on the configured cadence
    #[arg(long)]
    spawning: bool,

    /// Search paths on the background worker
    #[arg(long)]
    offload: bool,

    /// Print every Nth tick in summary mode
    #[arg(long, default_value_t = 60)]
    every: u32,

    /// Custom data directory (defaults to the bundled content)
    #[arg(short, long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Output format (JSON emits one report per line)
    #[arg(short, long, value_enum, default_value = "summary")]
    format: OutputFormat,
}

impl Simulate {
    pub fn execute(self) -> Result<()> {
        let factory = utils::content_factory(self.data_dir.clone());
        let pursuit = factory.load_config().context("Failed to load pursuit config")?;
        let level = factory
            .load_level(&self.level)
            .with_context(|| format!("Failed to load level `{}`", self.level))?;

        let runtime = tokio::runtime::Runtime::new().context("Failed to start tokio runtime")?;
        runtime.block_on(self.run(pursuit, level))
    }

    async fn run(self, pursuit: PursuitConfig, level: LoadedLevel) -> Result<()> {
        let config = RuntimeConfig {
            pursuit,
            world_seed: self.seed,
            offload_paths: self.offload,
            ..RuntimeConfig::default()
        };
        let frame = level.frame;
        let runtime = Runtime::builder()
            .config(config)
            .initial_level(level)
            .build()
            .await?;
        let handle = runtime.handle();

        for tile in &self.enemies {
            handle.spawn(AgentKind::Enemy, *tile).await?;
        }
        for tile in &self.npcs {
            handle.spawn(AgentKind::Npc, *tile).await?;
        }
        handle.set_spawning(self.spawning).await?;

        let mut contacts = 0usize;
        for _ in 0..self.ticks {
            if self.offload {
                handle.settle_paths().await?;
            }
            let report = handle.tick(PursuitConfig::TICK_MS).await?;
            contacts += report
                .events
                .iter()
                .filter(|event| matches!(event, SimEvent::Contact { .. }))
                .count();

            match self.format {
                OutputFormat::Json => println!("{}", serde_json::to_string(&report)?),
                OutputFormat::Summary => {
                    if self.every > 0 && report.tick % u64::from(self.every) == 0 {
                        print_report(&report, &frame);
                    }
                    print_events(&report);
                }
            }
        }

        if let OutputFormat::Summary = self.format {
            println!();
            println!(
                "{} {} ticks, {} contacts",
                style("Done:").bold().green(),
                self.ticks,
                contacts
            );
        }

        drop(handle);
        runtime.shutdown().await?;
        Ok(())
    }
}

fn print_report(report: &TickReport, map: &MapFrame) {
    println!("{} {}", style("Tick").bold().cyan(), report.tick);
    for frame in &report.agents {
        let tile = map.tile_at(frame.position);
        println!(
            "  {} {:<6} {:<10} {} {}{}",
            frame.agent,
            frame.kind,
            frame.mode,
            tile,
            frame.animation,
            if frame.no_path { " (no path)" } else { "" }
        );
    }
}

fn print_events(report: &TickReport) {
    for event in &report.events {
        let line = match event {
            SimEvent::LevelLoaded { name, generation } => {
                format!("level {name} loaded (generation {generation})")
            }
            SimEvent::LevelUnloaded { generation } => format!("level unloaded (generation {generation})"),
            SimEvent::Spawned { agent, kind, tile } => format!("{kind} {agent} spawned at {tile}"),
            SimEvent::ModeChanged { agent, from, to } => format!("{agent} {from} -> {to}"),
            SimEvent::Contact { agent, position } => format!("{agent} reached the target at {position}"),
            SimEvent::Despawned { agent } => format!("{agent} despawned"),
        };
        println!("  {} {}", style(format!("[{}]", report.tick)).dim(), line);
    }
}
