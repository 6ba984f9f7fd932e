// Use-case level inputs/outputs for the world task.

use super::registry::{ConnectionId, Outbound};
use crate::domain::{Arena, PuckId, PuckView, Snapshot};

/// Everything a connection task can ask of the world.
#[derive(Debug)]
pub enum GameEvent {
    Connect {
        conn_id: ConnectionId,
        outbound: Outbound,
    },
    Join {
        conn_id: ConnectionId,
        nickname: String,
        color: String,
    },
    Leave {
        conn_id: ConnectionId,
    },
    ChangeColor {
        conn_id: ConnectionId,
        color: String,
    },
    Disconnect {
        conn_id: ConnectionId,
    },
}

impl GameEvent {
    pub fn conn_id(&self) -> ConnectionId {
        match self {
            GameEvent::Connect { conn_id, .. }
            | GameEvent::Join { conn_id, .. }
            | GameEvent::Leave { conn_id }
            | GameEvent::ChangeColor { conn_id, .. }
            | GameEvent::Disconnect { conn_id } => *conn_id,
        }
    }
}

/// Messages the world pushes to connections, before wire encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    SpectatorInit { pucks: Vec<PuckView>, arena: Arena },
    PlayerInit(PuckView),
    NewPlayer(PuckView),
    PlayerLeft(PuckId),
    SpectatorMode,
    State(Snapshot),
}

impl Notice {
    pub fn kind(&self) -> &'static str {
        match self {
            Notice::SpectatorInit { .. } => "spectator_init",
            Notice::PlayerInit(_) => "player_init",
            Notice::NewPlayer(_) => "new_player",
            Notice::PlayerLeft(_) => "player_left",
            Notice::SpectatorMode => "spectator_mode",
            Notice::State(_) => "state",
        }
    }
}

/// What one tick did, for logging and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub population: usize,
    pub recipients: usize,
    pub evicted: usize,
    pub state_sent: bool,
}
