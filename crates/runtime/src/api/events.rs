//! Events and per-tick reports emitted by the simulation.
use serde::{Deserialize, Serialize};

use survivor_core::{AgentId, AgentKind, Facing, Mode, TileCoord, WorldPos};

/// Something that happened during a tick (or between ticks).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    LevelLoaded { name: String, generation: u64 },
    LevelUnloaded { generation: u64 },
    Spawned { agent: AgentId, kind: AgentKind, tile: TileCoord },
    ModeChanged { agent: AgentId, from: Mode, to: Mode },
    /// Agent touched the target and was removed.
    Contact { agent: AgentId, position: WorldPos },
    Despawned { agent: AgentId },
}

/// Observable state of one agent after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AgentFrame {
    pub agent: AgentId,
    pub kind: AgentKind,
    pub mode: Mode,
    pub position: WorldPos,
    pub facing: Facing,
    pub animation: &'static str,
    pub no_path: bool,
}

/// Result of [`crate::Simulation::tick`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TickReport {
    pub tick: u64,
    pub agents: Vec<AgentFrame>,
    pub events: Vec<SimEvent>,
}

impl TickReport {
    pub fn frame(&self, agent: AgentId) -> Option<&AgentFrame> {
        self.agents.iter().find(|frame| frame.agent == agent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use survivor_core::Direction;

    #[test]
    fn tick_report_serializes_frames_and_events() {
        let facing = Facing::Moving(Direction::Left);
        let report = TickReport {
            tick: 7,
            agents: vec![AgentFrame {
                agent: AgentId(3),
                kind: AgentKind::Enemy,
                mode: Mode::Chase,
                position: WorldPos::new(48.0, 16.0),
                facing,
                animation: AgentKind::Enemy.animation_key(facing),
                no_path: false,
            }],
            events: vec![SimEvent::Despawned { agent: AgentId(3) }],
        };

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["tick"], 7);
        assert_eq!(value["agents"][0]["animation"], "enemy-left");
        assert_eq!(value["agents"][0]["kind"], "enemy");
        assert_eq!(value["agents"][0]["no_path"], false);
        assert_eq!(value["events"].as_array().map(Vec::len), Some(1));
    }

    #[test]
    fn events_survive_json_transport() {
        let events = vec![
            SimEvent::LevelLoaded {
                name: "street".into(),
                generation: 2,
            },
            SimEvent::ModeChanged {
                agent: AgentId(1),
                from: Mode::Wander,
                to: Mode::Chase,
            },
            SimEvent::Contact {
                agent: AgentId(1),
                position: WorldPos::new(66.0, 66.0),
            },
        ];

        let json = serde_json::to_string(&events).unwrap();
        let decoded: Vec<SimEvent> = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, events);
    }
}
