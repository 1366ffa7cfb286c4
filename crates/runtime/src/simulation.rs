//! Single-threaded tick driver for every agent on the active level.
//!
//! One [`Simulation::tick`] updates all agents in id order against the
//! current grid. Loading or unloading a level finishes before the next tick
//! runs, and drops every agent that belonged to the previous level.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info};

use survivor_content::LoadedLevel;
use survivor_core::{
    AgentId, AgentKind, ChaseController, ChaseProfile, ChaseTick, Facing, GridPlanner,
    LevelContext, MapFrame, Mode, NavError, NavGrid, PcgRng, Planner, PursuitConfig, RngOracle, SeedContext,
    TileCoord, WorldPos, compute_seed,
};

use crate::api::{AgentFrame, Result, RuntimeError, SimEvent, TickReport};
use crate::workers::{PathReply, PathWorkerClient};

/// One pursuing agent.
#[derive(Debug, Clone)]
pub struct Agent {
    pub id: AgentId,
    pub kind: AgentKind,
    pub position: WorldPos,
    pub facing: Facing,
    pub no_path: bool,
    controller: ChaseController,
}

impl Agent {
    pub fn mode(&self) -> Mode {
        self.controller.mode()
    }

    pub fn controller(&self) -> &ChaseController {
        &self.controller
    }

    fn frame(&self) -> AgentFrame {
        AgentFrame {
            agent: self.id,
            kind: self.kind,
            mode: self.controller.mode(),
            position: self.position,
            facing: self.facing,
            animation: self.kind.animation_key(self.facing),
            no_path: self.no_path,
        }
    }
}

enum Backend {
    Inline(GridPlanner),
    Worker(PathWorkerClient),
}

/// Tick-loop state: level context, agents, target and spawn cadence.
pub struct Simulation {
    config: PursuitConfig,
    world_seed: u64,
    level: LevelContext,
    level_name: Option<String>,
    enemy_start: TileCoord,
    agents: BTreeMap<AgentId, Agent>,
    next_agent: u32,
    max_agents: usize,
    target: WorldPos,
    tick: u64,
    spawn_countdown: u32,
    spawning: bool,
    pending_events: Vec<SimEvent>,
    backend: Backend,
    rng: PcgRng,
}

impl Simulation {
    pub const DEFAULT_MAX_AGENTS: usize = 128;

    /// Simulation that runs searches inline.
    pub fn new(config: PursuitConfig, world_seed: u64) -> Self {
        Self {
            level: LevelContext::new(MapFrame::new(WorldPos::ZERO, config.cell_size)),
            spawn_countdown: config.spawn_interval_ticks,
            config,
            world_seed,
            level_name: None,
            enemy_start: TileCoord::ORIGIN,
            agents: BTreeMap::new(),
            next_agent: 1,
            max_agents: Self::DEFAULT_MAX_AGENTS,
            target: WorldPos::ZERO,
            tick: 0,
            spawning: false,
            pending_events: Vec::new(),
            backend: Backend::Inline(GridPlanner),
            rng: PcgRng,
        }
    }

    /// Routes searches through a background path worker.
    pub fn with_path_worker(mut self, client: PathWorkerClient) -> Self {
        self.backend = Backend::Worker(client);
        self.sync_worker_grid();
        self
    }

    pub fn with_max_agents(mut self, max_agents: usize) -> Self {
        self.max_agents = max_agents;
        self
    }

    /// Enables periodic enemy spawns at the level's enemy start.
    pub fn set_spawning(&mut self, spawning: bool) {
        self.spawning = spawning;
        self.spawn_countdown = self.config.spawn_interval_ticks;
    }

    pub fn config(&self) -> &PursuitConfig {
        &self.config
    }

    pub fn level(&self) -> &LevelContext {
        &self.level
    }

    pub fn level_name(&self) -> Option<&str> {
        self.level_name.as_deref()
    }

    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    pub fn target(&self) -> WorldPos {
        self.target
    }

    pub fn set_target(&mut self, target: WorldPos) {
        self.target = target;
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(&id)
    }

    pub fn agents(&self) -> impl Iterator<Item = &Agent> {
        self.agents.values()
    }

    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    /// Current frames for every agent, in id order.
    pub fn frames(&self) -> Vec<AgentFrame> {
        self.agents.values().map(Agent::frame).collect()
    }

    /// Searches submitted to the path worker and not yet drained.
    pub fn paths_in_flight(&self) -> usize {
        match &self.backend {
            Backend::Inline(_) => 0,
            Backend::Worker(client) => client.in_flight(),
        }
    }

    /// Installs `level`, replacing any previous one. Agents of the previous
    /// level are dropped; the target moves to the player start; room levels
    /// are populated. Returns the new grid generation.
    pub fn load_level(&mut self, level: &LoadedLevel) -> Result<u64> {
        self.agents.clear();
        let generation = self.level.install(level.grid.clone(), level.frame);
        self.level_name = Some(level.name.clone());
        self.enemy_start = level.enemy_start;
        self.target = level.frame.tile_center(level.player_start);
        self.spawn_countdown = self.config.spawn_interval_ticks;
        self.sync_worker_grid();

        info!(level = %level.name, generation, doors = level.doors.len(), "level loaded");
        self.pending_events.push(SimEvent::LevelLoaded {
            name: level.name.clone(),
            generation,
        });

        if let Some((min, max)) = level.population {
            self.populate(min, max, level.player_start)?;
        }
        Ok(generation)
    }

    /// Tears down the active level and its agents.
    pub fn unload_level(&mut self) {
        let generation = self.level.generation();
        self.level.clear();
        self.level_name = None;
        self.agents.clear();
        self.sync_worker_grid();
        self.pending_events.push(SimEvent::LevelUnloaded { generation });
    }

    /// Adds an agent at the walkable tile nearest to `tile`.
    pub fn spawn(&mut self, kind: AgentKind, tile: TileCoord) -> Result<AgentId> {
        if self.agents.len() >= self.max_agents {
            return Err(RuntimeError::AgentLimit {
                limit: self.max_agents,
            });
        }
        let grid = self.level.grid()?;
        let tile = grid
            .nearest_walkable(tile)
            .ok_or(RuntimeError::NoSpawnTile(tile))?;
        let position = self.level.frame().tile_center(tile);

        let id = AgentId(self.next_agent);
        self.next_agent += 1;
        let profile = ChaseProfile::from_config(kind, &self.config);
        let agent = Agent {
            id,
            kind,
            position,
            facing: Facing::Stopped,
            no_path: false,
            controller: ChaseController::new(id, profile, self.world_seed),
        };
        self.agents.insert(id, agent);

        debug!(agent = %id, %kind, %tile, "agent spawned");
        self.pending_events.push(SimEvent::Spawned { agent: id, kind, tile });
        Ok(id)
    }

    pub fn despawn(&mut self, id: AgentId) -> Result<()> {
        self.agents
            .remove(&id)
            .ok_or(RuntimeError::UnknownAgent(id))?;
        self.pending_events.push(SimEvent::Despawned { agent: id });
        Ok(())
    }

    /// Sends an NPC away. Returns `false` for agents that cannot retreat.
    pub fn reject(&mut self, id: AgentId) -> Result<bool> {
        let agent = self
            .agents
            .get_mut(&id)
            .ok_or(RuntimeError::UnknownAgent(id))?;
        Ok(agent.controller.reject(agent.position))
    }

    /// Patches one grid cell and refreshes the worker's snapshot.
    pub fn set_walkable(&mut self, tile: TileCoord, walkable: bool) -> Result<()> {
        self.level.grid_mut()?.set_walkable(tile, walkable);
        self.sync_worker_grid();
        Ok(())
    }

    /// Advances every agent by `elapsed_ms`.
    pub fn tick(&mut self, elapsed_ms: u32) -> Result<TickReport> {
        if !self.level.is_ready() {
            return Err(NavError::NotReady.into());
        }
        self.spawn_on_cadence()?;
        self.tick += 1;
        let mut events = std::mem::take(&mut self.pending_events);

        self.deliver_paths();

        let grid = self.level.grid()?;
        let frame = *self.level.frame();
        let planner: &mut dyn Planner = match &mut self.backend {
            Backend::Inline(planner) => planner,
            Backend::Worker(client) => client,
        };

        let mut touched = Vec::new();
        for agent in self.agents.values_mut() {
            let before = agent.controller.mode();
            let tick = ChaseTick {
                grid,
                frame: &frame,
                position: agent.position,
                target: self.target,
                elapsed_ms,
            };
            let motion = agent.controller.update(&tick, planner);

            agent.position = motion.position;
            agent.facing = motion.facing;
            agent.no_path = motion.no_path;

            let after = agent.controller.mode();
            if before != after {
                events.push(SimEvent::ModeChanged {
                    agent: agent.id,
                    from: before,
                    to: after,
                });
            }
            if agent.kind == AgentKind::Enemy
                && agent.position.distance(self.target) < self.config.contact_radius
            {
                touched.push(agent.id);
            }
        }

        for id in touched {
            if let Some(agent) = self.agents.remove(&id) {
                debug!(agent = %id, position = %agent.position, "contact with target");
                events.push(SimEvent::Contact {
                    agent: id,
                    position: agent.position,
                });
            }
        }

        Ok(TickReport {
            tick: self.tick,
            agents: self.frames(),
            events,
        })
    }

    fn deliver_paths(&mut self) {
        let Backend::Worker(client) = &mut self.backend else {
            return;
        };
        let replies = client.drain();
        for reply in replies {
            self.apply_reply(reply);
        }
    }

    /// Waits until every submitted search has been answered and applied.
    ///
    /// Searches issued while waiting are not awaited.
    pub async fn settle_paths(&mut self) {
        loop {
            let Backend::Worker(client) = &mut self.backend else {
                return;
            };
            if client.in_flight() == 0 {
                return;
            }
            let Some(reply) = client.recv().await else {
                return;
            };
            self.apply_reply(reply);
        }
    }

    fn apply_reply(&mut self, reply: PathReply) {
        let generation = self.level.generation();
        if reply.generation != generation {
            debug!(
                agent = %reply.agent,
                seq = reply.seq,
                stale = reply.generation,
                current = generation,
                "dropped path from previous grid"
            );
            return;
        }
        if let Some(agent) = self.agents.get_mut(&reply.agent) {
            agent.controller.deliver(reply.seq, reply.path);
        }
    }

    /// Runs before any per-tick state changes; a failed spawn leaves the
    /// countdown at zero so the next tick retries.
    fn spawn_on_cadence(&mut self) -> Result<()> {
        if !self.spawning {
            return Ok(());
        }
        if self.spawn_countdown > 0 {
            self.spawn_countdown -= 1;
            return Ok(());
        }

        match self.spawn(AgentKind::Enemy, self.enemy_start) {
            Ok(_) => {}
            Err(RuntimeError::AgentLimit { limit }) => {
                debug!(limit, "spawn skipped, agent limit reached");
            }
            Err(err) => return Err(err),
        }
        self.spawn_countdown = self.config.spawn_interval_ticks;
        Ok(())
    }

    /// Places a random number of enemies on random walkable interior cells.
    fn populate(&mut self, min: u32, max: u32, avoid: TileCoord) -> Result<()> {
        let generation = self.level.generation();
        let count = self.rng.range(
            compute_seed(self.world_seed, generation, 0, SeedContext::RoomPopulation),
            min,
            max,
        );

        let candidates: Vec<TileCoord> = {
            let grid = self.level.grid()?;
            interior_tiles(grid)
                .filter(|tile| *tile != avoid)
                .collect()
        };
        if candidates.is_empty() {
            return Ok(());
        }

        for n in 0..count {
            let seed = compute_seed(self.world_seed, generation, n, SeedContext::SpawnCell);
            let tile = candidates[self.rng.pick(seed, candidates.len())];
            self.spawn(AgentKind::Enemy, tile)?;
        }
        Ok(())
    }

    fn sync_worker_grid(&mut self) {
        let snapshot = self.level.grid().ok().map(|grid| Arc::new(grid.clone()));
        let generation = self.level.generation();
        if let Backend::Worker(client) = &mut self.backend {
            client.set_grid(snapshot, generation);
        }
    }
}

fn interior_tiles(grid: &NavGrid) -> impl Iterator<Item = TileCoord> + '_ {
    let width = grid.width() as i32;
    let height = grid.height() as i32;
    (1..height - 1)
        .flat_map(move |row| (1..width - 1).map(move |col| TileCoord::new(col, row)))
        .filter(|tile| grid.is_walkable(*tile))
}

#[cfg(test)]
mod tests {
    use super::*;
    use survivor_core::{CollisionRule, MapDimensions, TileLayer};

    fn open_level(name: &str, width: u32, height: u32) -> LoadedLevel {
        let dimensions = MapDimensions::new(width, height);
        let frame = MapFrame::new(WorldPos::ZERO, 32.0);
        LoadedLevel {
            name: name.into(),
            dimensions,
            frame,
            layers: vec![TileLayer::empty("ground", dimensions, CollisionRule::None)],
            doors: Vec::new(),
            grid: NavGrid::open(width, height).unwrap(),
            player_start: TileCoord::new(0, 0),
            enemy_start: TileCoord::new(width as i32 - 1, height as i32 - 1),
            population: None,
        }
    }

    #[test]
    fn tick_without_level_is_not_ready() {
        let mut sim = Simulation::new(PursuitConfig::default(), 1);
        let err = sim.tick(16).unwrap_err();
        assert!(matches!(err, RuntimeError::Nav(NavError::NotReady)));
        assert_eq!(sim.current_tick(), 0);
    }

    #[test]
    fn spawn_cadence_follows_interval() {
        let config = PursuitConfig {
            spawn_interval_ticks: 3,
            ..PursuitConfig::default()
        };
        let mut sim = Simulation::new(config, 1);
        sim.load_level(&open_level("street", 10, 10)).unwrap();
        sim.set_spawning(true);

        let spawned: Vec<u64> = (0..12)
            .filter_map(|_| {
                let report = sim.tick(16).unwrap();
                report
                    .events
                    .iter()
                    .any(|event| matches!(event, SimEvent::Spawned { .. }))
                    .then_some(report.tick)
            })
            .collect();

        assert_eq!(spawned, vec![4, 8, 12]);
    }

    #[test]
    fn loading_a_level_drops_previous_agents() {
        let mut sim = Simulation::new(PursuitConfig::default(), 1);
        sim.load_level(&open_level("street", 10, 10)).unwrap();
        sim.spawn(AgentKind::Enemy, TileCoord::new(5, 5)).unwrap();
        assert_eq!(sim.agent_count(), 1);

        let generation = sim.load_level(&open_level("clinic", 6, 6)).unwrap();
        assert_eq!(generation, 2);
        assert_eq!(sim.agent_count(), 0);
        assert_eq!(sim.level_name(), Some("clinic"));
    }

    #[test]
    fn room_population_stays_in_range_and_on_walkable_cells() {
        let mut level = open_level("clinic", 20, 10);
        level.population = Some((1, 3));
        let mut sim = Simulation::new(PursuitConfig::default(), 42);
        sim.load_level(&level).unwrap();

        assert!((1..=3).contains(&sim.agent_count()));
        let grid = sim.level().grid().unwrap();
        for agent in sim.agents() {
            let tile = sim.level().frame().tile_at(agent.position);
            assert!(grid.is_walkable(tile));
            assert_ne!(tile, level.player_start);
        }
    }

    #[test]
    fn enemy_touching_target_is_removed() {
        let mut sim = Simulation::new(PursuitConfig::default(), 1);
        sim.load_level(&open_level("street", 10, 10)).unwrap();
        let id = sim.spawn(AgentKind::Enemy, TileCoord::new(1, 0)).unwrap();

        let mut contact = None;
        for _ in 0..200 {
            let report = sim.tick(16).unwrap();
            contact = report.events.iter().find_map(|event| match event {
                SimEvent::Contact { agent, .. } => Some(*agent),
                _ => None,
            });
            if contact.is_some() {
                break;
            }
        }

        assert_eq!(contact, Some(id));
        assert!(sim.agent(id).is_none());
    }

    #[test]
    fn enemy_reaches_target_off_its_tile_center() {
        let mut sim = Simulation::new(PursuitConfig::default(), 1);
        sim.load_level(&open_level("street", 10, 10)).unwrap();
        let center = sim.level().frame().tile_center(TileCoord::new(2, 2));
        sim.set_target(WorldPos::new(center.x - 14.0, center.y - 14.0));
        let id = sim.spawn(AgentKind::Enemy, TileCoord::new(5, 2)).unwrap();

        let mut contact = None;
        for _ in 0..1000 {
            let report = sim.tick(16).unwrap();
            if let Some(frame) = report.frame(id) {
                assert!(!frame.no_path);
            }
            contact = report.events.iter().find_map(|event| match event {
                SimEvent::Contact { agent, .. } => Some(*agent),
                _ => None,
            });
            if contact.is_some() {
                break;
            }
        }

        assert_eq!(contact, Some(id));
    }

    #[test]
    fn failed_cadence_spawn_keeps_tick_and_events() {
        let config = PursuitConfig {
            spawn_interval_ticks: 0,
            ..PursuitConfig::default()
        };
        let mut level = open_level("alley", 3, 3);
        level.grid = NavGrid::from_ascii(
            "
            ###
            ###
            ###
            ",
        )
        .unwrap();
        let mut sim = Simulation::new(config, 1);
        sim.load_level(&level).unwrap();
        sim.set_spawning(true);

        let err = sim.tick(16).unwrap_err();
        assert!(matches!(err, RuntimeError::NoSpawnTile(_)));
        assert_eq!(sim.current_tick(), 0);

        sim.set_walkable(TileCoord::new(1, 1), true).unwrap();
        let report = sim.tick(16).unwrap();

        assert_eq!(report.tick, 1);
        assert!(matches!(
            report.events.first(),
            Some(SimEvent::LevelLoaded { name, .. }) if name == "alley"
        ));
        assert!(report
            .events
            .iter()
            .any(|event| matches!(event, SimEvent::Spawned { tile, .. } if *tile == TileCoord::new(1, 1))));
    }

    #[test]
    fn reject_unknown_agent_errors() {
        let mut sim = Simulation::new(PursuitConfig::default(), 1);
        sim.load_level(&open_level("street", 4, 4)).unwrap();
        assert!(matches!(
            sim.reject(AgentId(99)),
            Err(RuntimeError::UnknownAgent(AgentId(99)))
        ));
    }
}
