// Client-side mirror of the board: merges server snapshots and dead-reckons between them.

use crate::domain::systems::movement::bounce_axis;
use crate::domain::{Arena, Axis, Point, PuckId};
use crate::interface_adapters::protocol::{BoardDto, PartialPuckRecord, PuckRecord, ServerMessage};

/// Locally cached puck. Fields the server has not sent yet stay `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictedPuck {
    pub id: PuckId,
    pub nickname: Option<String>,
    pub color: Option<String>,
    pub pos: Point,
    pub velocity: Point,
    pub size: Option<Point>,
    pub corner_hits: u32,
}

impl PredictedPuck {
    fn half_extents(&self) -> Point {
        self.size.map(|s| s * 0.5).unwrap_or(Point::ZERO)
    }

    fn from_partial(record: &PartialPuckRecord) -> Self {
        Self {
            id: record.id,
            nickname: None,
            color: record.color.clone(),
            pos: record.pos.into(),
            velocity: record.velocity.into(),
            size: record.size.map(Point::from),
            corner_hits: record.corner_hits.unwrap_or(0),
        }
    }

    // Present fields overwrite; motion is always present.
    fn merge(&mut self, record: &PartialPuckRecord) -> bool {
        self.pos = record.pos.into();
        self.velocity = record.velocity.into();
        if let Some(size) = record.size {
            self.size = Some(size.into());
        }

        let mut restyled = false;
        if let Some(color) = &record.color {
            restyled |= self.color.as_ref() != Some(color);
            self.color = Some(color.clone());
        }
        if let Some(hits) = record.corner_hits {
            restyled |= self.corner_hits != hits;
            self.corner_hits = hits;
        }
        restyled
    }
}

impl From<&PuckRecord> for PredictedPuck {
    fn from(record: &PuckRecord) -> Self {
        Self {
            id: record.id,
            nickname: Some(record.nickname.clone()),
            color: Some(record.color.clone()),
            pos: record.pos.into(),
            velocity: record.velocity.into(),
            size: Some(record.size.into()),
            corner_hits: record.corner_hits,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub id: PuckId,
    pub nickname: String,
    pub corner_hits: u32,
}

#[derive(Debug, Clone)]
pub struct ClientPredictor {
    board: Arena,
    pucks: Vec<PredictedPuck>,
    own_id: Option<PuckId>,
}

impl Default for ClientPredictor {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientPredictor {
    pub fn new() -> Self {
        Self {
            board: Arena::default(),
            pucks: Vec::new(),
            own_id: None,
        }
    }

    pub fn board(&self) -> &Arena {
        &self.board
    }

    pub fn pucks(&self) -> &[PredictedPuck] {
        &self.pucks
    }

    pub fn get(&self, id: PuckId) -> Option<&PredictedPuck> {
        self.pucks.iter().find(|p| p.id == id)
    }

    pub fn own_id(&self) -> Option<PuckId> {
        self.own_id
    }

    /// Resets the cache to a fresh spectator view.
    pub fn apply_init(&mut self, players: &[PuckRecord], board: BoardDto) {
        self.board = Arena {
            width: board.width,
            height: board.height,
            ..Arena::default()
        };
        self.pucks = players.iter().map(PredictedPuck::from).collect();
        self.own_id = None;
    }

    pub fn insert(&mut self, record: &PuckRecord) {
        let puck = PredictedPuck::from(record);
        match self.pucks.iter_mut().find(|p| p.id == record.id) {
            Some(existing) => *existing = puck,
            None => self.pucks.push(puck),
        }
    }

    pub fn remove(&mut self, id: PuckId) -> bool {
        let before = self.pucks.len();
        self.pucks.retain(|p| p.id != id);
        if self.own_id == Some(id) {
            self.own_id = None;
        }
        self.pucks.len() != before
    }

    /// Merges an authoritative snapshot. Returns true when the roster, a color, or a corner
    /// count changed.
    pub fn apply_state(&mut self, players: &[PartialPuckRecord]) -> bool {
        let mut changed = false;
        let mut next = Vec::with_capacity(players.len());

        for record in players {
            match self.pucks.iter().position(|p| p.id == record.id) {
                Some(index) => {
                    let mut puck = self.pucks.swap_remove(index);
                    changed |= puck.merge(record);
                    next.push(puck);
                }
                None => {
                    next.push(PredictedPuck::from_partial(record));
                    changed = true;
                }
            }
        }

        // Whatever was not mentioned is gone.
        if !self.pucks.is_empty() {
            changed = true;
        }
        if let Some(own) = self.own_id {
            if !next.iter().any(|p| p.id == own) {
                self.own_id = None;
            }
        }
        self.pucks = next;
        changed
    }

    /// Extrapolates every puck by `dt` seconds using the server's wall rule. No corner
    /// scoring and no puck-vs-puck contact.
    pub fn predict(&mut self, dt: f64) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }
        for puck in &mut self.pucks {
            let half = puck.half_extents();
            puck.pos = puck.pos + puck.velocity * dt;
            for axis in Axis::BOTH {
                let (min, max) = self.board.center_range(axis, half);
                let mut pos = puck.pos.get(axis);
                let mut vel = puck.velocity.get(axis);
                if bounce_axis(&mut pos, &mut vel, min, max) {
                    puck.pos.set(axis, pos);
                    puck.velocity.set(axis, vel);
                }
            }
        }
    }

    /// Applies one server message. Returns true when the leaderboard may have changed.
    pub fn handle(&mut self, msg: &ServerMessage) -> bool {
        match msg {
            ServerMessage::SpectatorInit { players, board } => {
                self.apply_init(players, *board);
                true
            }
            ServerMessage::PlayerInit { player } => {
                self.insert(player);
                self.own_id = Some(player.id);
                true
            }
            ServerMessage::NewPlayer { player } => {
                self.insert(player);
                true
            }
            ServerMessage::PlayerLeft { player_id } => self.remove(*player_id),
            ServerMessage::SpectatorMode => match self.own_id.take() {
                Some(own) => self.remove(own),
                None => false,
            },
            ServerMessage::State { players } => self.apply_state(players),
            ServerMessage::Pong { .. } => false,
        }
    }

    /// Pucks ordered by corner hits, most first; ties broken by nickname.
    pub fn leaderboard(&self) -> Vec<LeaderboardEntry> {
        let mut entries: Vec<LeaderboardEntry> = self
            .pucks
            .iter()
            .map(|p| LeaderboardEntry {
                id: p.id,
                nickname: p.nickname.clone().unwrap_or_else(|| "?".to_string()),
                corner_hits: p.corner_hits,
            })
            .collect();
        entries.sort_by(|a, b| {
            b.corner_hits
                .cmp(&a.corner_hits)
                .then_with(|| a.nickname.cmp(&b.nickname))
        });
        entries
    }
}
