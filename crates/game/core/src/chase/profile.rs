use std::fmt;

use crate::config::PursuitConfig;
use crate::geometry::{Direction, Facing};
use crate::path::PathOptions;

/// Identifier of a pursuing agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentId(pub u32);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which family of pursuer an agent belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum AgentKind {
    Enemy,
    Npc,
}

impl AgentKind {
    /// Animation clip for `facing`, e.g. `enemy-left` or `npc-idle`.
    pub fn animation_key(self, facing: Facing) -> &'static str {
        match (self, facing) {
            (Self::Enemy, Facing::Moving(Direction::Left)) => "enemy-left",
            (Self::Enemy, Facing::Moving(Direction::Right)) => "enemy-right",
            (Self::Enemy, Facing::Moving(Direction::Up)) => "enemy-up",
            (Self::Enemy, Facing::Moving(Direction::Down)) => "enemy-down",
            (Self::Enemy, Facing::Stopped) => "enemy-idle",
            (Self::Npc, Facing::Moving(Direction::Left)) => "npc-left",
            (Self::Npc, Facing::Moving(Direction::Right)) => "npc-right",
            (Self::Npc, Facing::Moving(Direction::Up)) => "npc-up",
            (Self::Npc, Facing::Moving(Direction::Down)) => "npc-down",
            (Self::Npc, Facing::Stopped) => "npc-idle",
        }
    }
}

/// Distance threshold that may be infinite.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Radius {
    Within(f32),
    Unbounded,
}

impl Radius {
    /// Strictly inside the radius.
    pub fn contains(self, distance: f32) -> bool {
        match self {
            Self::Within(radius) => distance < radius,
            Self::Unbounded => true,
        }
    }

    /// Strictly outside the radius.
    pub fn exceeded_by(self, distance: f32) -> bool {
        match self {
            Self::Within(radius) => distance > radius,
            Self::Unbounded => false,
        }
    }
}

/// Parameters distinguishing enemy and NPC pursuit.
#[derive(Clone, Debug, PartialEq)]
pub struct ChaseProfile {
    pub kind: AgentKind,
    pub trigger_radius: Radius,
    pub release_radius: Radius,
    pub step_distance: f32,
    /// Holds position inside this distance. Zero disables.
    pub standoff_radius: f32,
    pub retreat_distance: f32,
    pub repath_interval_ms: u32,
    pub arrival_epsilon: f32,
    pub path_options: PathOptions,
    pub wander_straight_weight: u32,
    pub wander_step_distance: f32,
}

impl ChaseProfile {
    pub fn enemy() -> Self {
        Self::from_config(AgentKind::Enemy, &PursuitConfig::default())
    }

    pub fn npc() -> Self {
        Self::from_config(AgentKind::Npc, &PursuitConfig::default())
    }

    pub fn from_config(kind: AgentKind, config: &PursuitConfig) -> Self {
        let common = Self {
            kind,
            trigger_radius: Radius::Within(config.chase_trigger_radius),
            release_radius: Radius::Within(config.chase_release_radius),
            step_distance: config.enemy_step_distance,
            standoff_radius: 0.0,
            retreat_distance: 0.0,
            repath_interval_ms: config.repath_interval_ms,
            arrival_epsilon: config.arrival_epsilon,
            path_options: config.path_options(),
            wander_straight_weight: config.wander_straight_weight,
            wander_step_distance: config.wander_step_distance,
        };

        match kind {
            AgentKind::Enemy => common,
            AgentKind::Npc => Self {
                trigger_radius: Radius::Unbounded,
                release_radius: Radius::Unbounded,
                step_distance: config.npc_step_distance,
                standoff_radius: config.npc_standoff_radius,
                retreat_distance: config.npc_retreat_distance,
                ..common
            },
        }
    }

    pub fn can_retreat(&self) -> bool {
        self.retreat_distance > 0.0
    }
}
