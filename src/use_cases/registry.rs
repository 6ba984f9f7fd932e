// Connection registry: who is connected, and which puck (if any) each connection drives.

use crate::domain::PuckId;
use axum::extract::ws::Utf8Bytes;
use std::collections::HashMap;
use tokio::sync::mpsc;

pub type ConnectionId = u64;

/// Serialized messages queued for one connection's socket. Unbounded: a slow reader
/// accumulates messages rather than stalling the tick.
pub type Outbound = mpsc::UnboundedSender<Utf8Bytes>;

/// Role of a live connection. A player always carries the id of the puck it owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Spectator,
    Player(PuckId),
}

#[derive(Debug)]
pub struct Connection {
    id: ConnectionId,
    role: Role,
    outbound: Outbound,
}

impl Connection {
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn owned_puck(&self) -> Option<PuckId> {
        match self.role {
            Role::Spectator => None,
            Role::Player(puck_id) => Some(puck_id),
        }
    }

    /// False once the socket side has hung up.
    pub fn is_open(&self) -> bool {
        !self.outbound.is_closed()
    }

    /// Queues a message. Returns false if the socket side is gone.
    pub fn send(&self, bytes: Utf8Bytes) -> bool {
        self.outbound.send(bytes).is_ok()
    }
}

#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: HashMap<ConnectionId, Connection>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    pub fn get(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    /// Registers a new connection as a spectator. Duplicate ids are rejected.
    pub fn register(&mut self, id: ConnectionId, outbound: Outbound) -> bool {
        if self.connections.contains_key(&id) {
            return false;
        }
        self.connections.insert(
            id,
            Connection {
                id,
                role: Role::Spectator,
                outbound,
            },
        );
        true
    }

    /// Whether `id` is a spectator that may take a puck.
    pub fn can_join(&self, id: ConnectionId) -> bool {
        matches!(self.role(id), Some(Role::Spectator))
    }

    pub fn role(&self, id: ConnectionId) -> Option<Role> {
        self.connections.get(&id).map(|c| c.role)
    }

    /// Spectator -> Player. Fails if the connection is unknown, already a player, or the
    /// puck is owned by someone else.
    pub fn bind(&mut self, id: ConnectionId, puck_id: PuckId) -> bool {
        if self.owner_of(puck_id).is_some() {
            return false;
        }
        match self.connections.get_mut(&id) {
            Some(conn) if conn.role == Role::Spectator => {
                conn.role = Role::Player(puck_id);
                true
            }
            _ => false,
        }
    }

    /// Player -> Spectator. Returns the released puck id.
    pub fn unbind(&mut self, id: ConnectionId) -> Option<PuckId> {
        let conn = self.connections.get_mut(&id)?;
        let puck_id = conn.owned_puck()?;
        conn.role = Role::Spectator;
        Some(puck_id)
    }

    /// Removes a connection. Safe to call for ids that are already gone.
    pub fn deregister(&mut self, id: ConnectionId) -> Option<Connection> {
        self.connections.remove(&id)
    }

    pub fn owner_of(&self, puck_id: PuckId) -> Option<ConnectionId> {
        self.connections
            .values()
            .find(|c| c.owned_puck() == Some(puck_id))
            .map(|c| c.id)
    }

    /// Drops every connection whose socket side has hung up and returns them.
    pub fn evict_closed(&mut self) -> Vec<Connection> {
        let closed: Vec<ConnectionId> = self
            .connections
            .values()
            .filter(|c| !c.is_open())
            .map(|c| c.id)
            .collect();
        closed
            .into_iter()
            .filter_map(|id| self.connections.remove(&id))
            .collect()
    }
}
