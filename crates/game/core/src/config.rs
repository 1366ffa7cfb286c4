use crate::path::CornerPolicy;

/// Tunable pursuit and navigation parameters.
///
/// Distances are in world pixels, intervals in milliseconds, and step sizes in
/// pixels per tick. The defaults reproduce the reference game feel.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PursuitConfig {
    pub cell_size: f32,
    pub repath_interval_ms: u32,
    /// Enemy enters Chase when the target is closer than this.
    pub chase_trigger_radius: f32,
    /// Enemy drops back to Wander when the target is farther than this.
    pub chase_release_radius: f32,
    pub enemy_step_distance: f32,
    pub npc_step_distance: f32,
    pub allow_diagonal: bool,
    pub corner_policy: CornerPolicy,
    pub wander_straight_weight: u32,
    pub wander_step_distance: f32,
    pub arrival_epsilon: f32,
    pub max_expansions: u32,
    /// NPCs stop approaching once inside this distance.
    pub npc_standoff_radius: f32,
    pub npc_retreat_distance: f32,
    pub contact_radius: f32,
    pub spawn_interval_ticks: u32,
}

impl PursuitConfig {
    pub const DEFAULT_CELL_SIZE: f32 = 32.0;
    pub const DEFAULT_REPATH_INTERVAL_MS: u32 = 600;
    pub const DEFAULT_CHASE_TRIGGER_RADIUS: f32 = 400.0;
    pub const DEFAULT_CHASE_RELEASE_RADIUS: f32 = 440.0;
    pub const DEFAULT_ENEMY_STEP_DISTANCE: f32 = 0.7;
    pub const DEFAULT_NPC_STEP_DISTANCE: f32 = 1.0;
    pub const DEFAULT_WANDER_STRAIGHT_WEIGHT: u32 = 4;
    pub const DEFAULT_WANDER_STEP_DISTANCE: f32 = 1.0;
    pub const DEFAULT_ARRIVAL_EPSILON: f32 = 1.0;
    pub const DEFAULT_MAX_EXPANSIONS: u32 = 10_000;
    pub const DEFAULT_NPC_STANDOFF_RADIUS: f32 = 60.0;
    pub const DEFAULT_NPC_RETREAT_DISTANCE: f32 = 3000.0;
    pub const DEFAULT_CONTACT_RADIUS: f32 = 16.0;
    pub const DEFAULT_SPAWN_INTERVAL_TICKS: u32 = 180;

    /// Nominal frame duration used to convert tick counts to milliseconds.
    pub const TICK_MS: u32 = 16;

    pub fn new() -> Self {
        Self {
            cell_size: Self::DEFAULT_CELL_SIZE,
            repath_interval_ms: Self::DEFAULT_REPATH_INTERVAL_MS,
            chase_trigger_radius: Self::DEFAULT_CHASE_TRIGGER_RADIUS,
            chase_release_radius: Self::DEFAULT_CHASE_RELEASE_RADIUS,
            enemy_step_distance: Self::DEFAULT_ENEMY_STEP_DISTANCE,
            npc_step_distance: Self::DEFAULT_NPC_STEP_DISTANCE,
            allow_diagonal: true,
            corner_policy: CornerPolicy::default(),
            wander_straight_weight: Self::DEFAULT_WANDER_STRAIGHT_WEIGHT,
            wander_step_distance: Self::DEFAULT_WANDER_STEP_DISTANCE,
            arrival_epsilon: Self::DEFAULT_ARRIVAL_EPSILON,
            max_expansions: Self::DEFAULT_MAX_EXPANSIONS,
            npc_standoff_radius: Self::DEFAULT_NPC_STANDOFF_RADIUS,
            npc_retreat_distance: Self::DEFAULT_NPC_RETREAT_DISTANCE,
            contact_radius: Self::DEFAULT_CONTACT_RADIUS,
            spawn_interval_ticks: Self::DEFAULT_SPAWN_INTERVAL_TICKS,
        }
    }

    pub fn with_repath_interval(mut self, repath_interval_ms: u32) -> Self {
        self.repath_interval_ms = repath_interval_ms;
        self
    }

    pub fn with_diagonal(mut self, allow_diagonal: bool) -> Self {
        self.allow_diagonal = allow_diagonal;
        self
    }

    /// Path options derived from the search-related fields.
    pub fn path_options(&self) -> crate::path::PathOptions {
        crate::path::PathOptions {
            allow_diagonal: self.allow_diagonal,
            corner_policy: self.corner_policy,
            max_expansions: Some(self.max_expansions),
            ..crate::path::PathOptions::default()
        }
    }
}

impl Default for PursuitConfig {
    fn default() -> Self {
        Self::new()
    }
}
