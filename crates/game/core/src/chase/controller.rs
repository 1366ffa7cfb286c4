use super::planner::{PlanPoll, PlanRequest, Planner};
use super::profile::{AgentId, ChaseProfile};
use crate::geometry::{Facing, MapFrame, Motion, WorldPos};
use crate::nav::NavGrid;
use crate::path::Path;
use crate::repath::{RepathScheduler, RepathTicket};
use crate::wander::WanderController;

/// Pursuit state of an agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Mode {
    #[default]
    Wander,
    Chase,
    /// Walking away after being rejected; resumes Chase on arrival.
    Disengaged,
}

/// World snapshot for one controller update.
#[derive(Clone, Copy, Debug)]
pub struct ChaseTick<'a> {
    pub grid: &'a NavGrid,
    pub frame: &'a MapFrame,
    pub position: WorldPos,
    pub target: WorldPos,
    pub elapsed_ms: u32,
}

/// Per-agent chase state machine.
///
/// Owns the agent's current path, its progress along it and the replan
/// cadence. Only [`ChaseController::update`] and
/// [`ChaseController::deliver`] mutate that state.
#[derive(Clone, Debug)]
pub struct ChaseController {
    agent: AgentId,
    profile: ChaseProfile,
    mode: Mode,
    scheduler: RepathScheduler,
    wander: WanderController,
    path: Path,
    path_index: usize,
    fresh_chase: bool,
    pending: Option<u64>,
    retreat_target: Option<WorldPos>,
}

impl ChaseController {
    pub fn new(agent: AgentId, profile: ChaseProfile, world_seed: u64) -> Self {
        let wander = WanderController::new(
            agent.0,
            world_seed,
            profile.wander_straight_weight,
            profile.wander_step_distance,
        );
        Self {
            agent,
            scheduler: RepathScheduler::new(profile.repath_interval_ms),
            profile,
            mode: Mode::Wander,
            wander,
            path: Path::empty(),
            path_index: 0,
            fresh_chase: false,
            pending: None,
            retreat_target: None,
        }
    }

    pub fn agent(&self) -> AgentId {
        self.agent
    }

    pub fn profile(&self) -> &ChaseProfile {
        &self.profile
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn path_index(&self) -> usize {
        self.path_index
    }

    /// Sequence number of the request still awaiting a result, if any.
    pub fn pending(&self) -> Option<u64> {
        self.pending
    }

    pub fn scheduler(&self) -> &RepathScheduler {
        &self.scheduler
    }

    pub fn wander(&self) -> &WanderController {
        &self.wander
    }

    /// Advances the agent by one tick and returns its proposed motion.
    pub fn update(&mut self, tick: &ChaseTick<'_>, planner: &mut dyn Planner) -> Motion {
        self.scheduler.advance(tick.elapsed_ms);
        let distance = tick.position.distance(tick.target);

        match self.mode {
            Mode::Disengaged => return self.retreat(tick.position),
            Mode::Wander if self.profile.trigger_radius.contains(distance) => {
                self.enter_chase(distance);
            }
            Mode::Wander => return self.wander.step(tick.position, tick.grid, tick.frame),
            Mode::Chase if self.profile.release_radius.exceeded_by(distance) => {
                self.enter_wander(distance);
                return self.wander.step(tick.position, tick.grid, tick.frame);
            }
            Mode::Chase => {}
        }

        if let Some(ticket) = self.scheduler.poll(self.path.is_empty(), self.fresh_chase) {
            self.fresh_chase = false;
            self.request_path(ticket, tick, planner);
        }

        if self.profile.standoff_radius > 0.0 && distance <= self.profile.standoff_radius {
            return Motion {
                position: tick.position,
                facing: Facing::from_displacement(
                    tick.target.x - tick.position.x,
                    tick.target.y - tick.position.y,
                ),
                no_path: false,
            };
        }

        self.follow(tick.position, tick.target, tick.frame)
    }

    /// Applies an offloaded search result.
    ///
    /// Returns `false` when the result is stale (an older request than one
    /// already applied) or the agent has stopped chasing.
    pub fn deliver(&mut self, seq: u64, path: Path) -> bool {
        if self.pending == Some(seq) {
            self.pending = None;
        }
        if self.mode != Mode::Chase || !self.scheduler.accept(seq) {
            tracing::trace!(agent = %self.agent, seq, "discarded stale path");
            return false;
        }
        self.install(path);
        true
    }

    /// Sends an NPC walking straight left. Returns `false` for profiles that
    /// cannot retreat.
    pub fn reject(&mut self, position: WorldPos) -> bool {
        if !self.profile.can_retreat() {
            return false;
        }
        let target = WorldPos::new(position.x - self.profile.retreat_distance, position.y);
        tracing::debug!(agent = %self.agent, from = %position, to = %target, "agent disengaging");
        self.mode = Mode::Disengaged;
        self.retreat_target = Some(target);
        self.clear_path();
        true
    }

    /// Drops the current path and in-flight request, e.g. after a level change.
    pub fn invalidate(&mut self) {
        self.clear_path();
        self.pending = None;
        self.scheduler.reset_cooldown();
        self.wander.reset();
    }

    fn enter_chase(&mut self, distance: f32) {
        tracing::debug!(agent = %self.agent, distance, "wander -> chase");
        self.mode = Mode::Chase;
        self.fresh_chase = true;
        self.clear_path();
    }

    fn enter_wander(&mut self, distance: f32) {
        tracing::debug!(agent = %self.agent, distance, "chase -> wander");
        self.mode = Mode::Wander;
        self.pending = None;
        self.clear_path();
        self.wander.reset();
    }

    fn request_path(&mut self, ticket: RepathTicket, tick: &ChaseTick<'_>, planner: &mut dyn Planner) {
        let request = PlanRequest {
            agent: self.agent,
            seq: ticket.seq,
            start: tick.frame.tile_at(tick.position),
            goal: tick.frame.tile_at(tick.target),
        };
        tracing::trace!(
            agent = %self.agent,
            seq = ticket.seq,
            reason = %ticket.reason,
            start = %request.start,
            goal = %request.goal,
            "requesting path"
        );

        match planner.request(tick.grid, request, &self.profile.path_options) {
            PlanPoll::Ready(path) => {
                if self.scheduler.accept(ticket.seq) {
                    self.install(path);
                }
            }
            PlanPoll::Pending => self.pending = Some(ticket.seq),
        }
    }

    fn install(&mut self, path: Path) {
        if path.is_empty() {
            tracing::debug!(agent = %self.agent, "empty path installed");
        }
        self.path = path;
        self.path_index = 0;
    }

    fn follow(&mut self, position: WorldPos, target: WorldPos, frame: &MapFrame) -> Motion {
        let Some(waypoint) = self.path.get(self.path_index).map(|tile| frame.tile_center(tile)) else {
            // Sharing the target's tile leaves nothing to plan; close the gap directly.
            if frame.tile_at(position) == frame.tile_at(target) {
                let next = position.step_toward(target, self.profile.step_distance);
                return Motion::between(position, next);
            }
            return Motion::hold(position).with_no_path();
        };

        let next = position.step_toward(waypoint, self.profile.step_distance);
        if next.distance(waypoint) < self.profile.arrival_epsilon {
            self.path_index += 1;
            if self.path_index >= self.path.len() {
                self.clear_path();
            }
        }
        Motion::between(position, next)
    }

    fn retreat(&mut self, position: WorldPos) -> Motion {
        let Some(target) = self.retreat_target else {
            self.mode = Mode::Chase;
            return Motion::hold(position);
        };

        let next = position.step_toward(target, self.profile.step_distance);
        if next == target {
            tracing::debug!(agent = %self.agent, "retreat finished, resuming chase");
            self.retreat_target = None;
            self.mode = Mode::Chase;
            self.fresh_chase = true;
        }
        Motion::between(position, next)
    }

    fn clear_path(&mut self) {
        self.path = Path::empty();
        self.path_index = 0;
    }
}
