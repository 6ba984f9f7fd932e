// Domain-level read models handed out of the simulation.

use super::point::Point;
use super::puck::{ChangedFields, Puck, PuckId};

/// Complete public state of one puck.
#[derive(Debug, Clone, PartialEq)]
pub struct PuckView {
    pub id: PuckId,
    pub nickname: String,
    pub color: String,
    pub pos: Point,
    pub velocity: Point,
    pub size: Point,
    pub corner_hits: u32,
}

/// Per-tick state of one puck: motion always, other fields only when they changed.
#[derive(Debug, Clone, PartialEq)]
pub struct PuckUpdate {
    pub id: PuckId,
    pub pos: Point,
    pub velocity: Point,
    pub color: Option<String>,
    pub size: Option<Point>,
    pub corner_hits: Option<u32>,
}

/// Authoritative summary of every live puck after a tick, in board order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub pucks: Vec<PuckUpdate>,
}

impl Snapshot {
    pub fn population(&self) -> usize {
        self.pucks.len()
    }
}

impl From<&Puck> for PuckView {
    fn from(p: &Puck) -> Self {
        Self {
            id: p.id(),
            nickname: p.nickname().to_string(),
            color: p.color().to_string(),
            pos: p.pos(),
            velocity: p.velocity(),
            size: p.size(),
            corner_hits: p.corner_hits(),
        }
    }
}

impl PuckUpdate {
    pub fn from_puck(p: &Puck, changed: ChangedFields) -> Self {
        Self {
            id: p.id(),
            pos: p.pos(),
            velocity: p.velocity(),
            color: changed.color.then(|| p.color().to_string()),
            size: changed.size.then(|| p.size()),
            corner_hits: changed.corner_hits.then(|| p.corner_hits()),
        }
    }
}
