// Authoritative simulation: the only place puck state is created, mutated, or removed.

use crate::domain::systems::{collisions, movement};
use crate::domain::tuning::PuckTuning;
use crate::domain::{Arena, Point, Puck, PuckId, PuckSpawn, PuckUpdate, PuckView, Snapshot};
use rand::Rng;
use rand::rngs::StdRng;
use tracing::info;
use uuid::Uuid;

/// Spawn headings: the four diagonals.
const SPAWN_ANGLES: [f64; 4] = [45.0, 135.0, 225.0, 315.0];

pub struct Simulation {
    arena: Arena,
    tuning: PuckTuning,
    pucks: Vec<Puck>,
    global_scale: f64,
    rng: StdRng,
}

impl Simulation {
    pub fn new(arena: Arena, tuning: PuckTuning, rng: StdRng) -> Self {
        Self {
            arena,
            tuning,
            pucks: Vec::new(),
            global_scale: tuning.scale_for_population(0),
            rng,
        }
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn pucks(&self) -> &[Puck] {
        &self.pucks
    }

    pub fn puck(&self, id: PuckId) -> Option<&Puck> {
        self.pucks.iter().find(|p| p.id() == id)
    }

    pub(crate) fn puck_mut(&mut self, id: PuckId) -> Option<&mut Puck> {
        self.pucks.iter_mut().find(|p| p.id() == id)
    }

    pub fn population(&self) -> usize {
        self.pucks.len()
    }

    pub fn global_scale(&self) -> f64 {
        self.global_scale
    }

    /// Full records of every live puck, in board order.
    pub fn views(&self) -> Vec<PuckView> {
        self.pucks.iter().map(PuckView::from).collect()
    }

    /// Spawns a puck at a random spot inside the inset margin, heading along a random
    /// diagonal at a jittered base speed.
    pub fn add_puck(&mut self, nickname: impl Into<String>, color: impl Into<String>) -> PuckView {
        // The newcomer already counts towards the shared scale it spawns with.
        let scale = self.tuning.scale_for_population(self.pucks.len() + 1);
        let half = Point::new(
            self.tuning.base_width * scale / 2.0,
            self.tuning.base_height * scale / 2.0,
        );

        let pos = Point::new(
            self.spawn_coordinate(self.arena.width, half.x),
            self.spawn_coordinate(self.arena.height, half.y),
        );
        let angle = SPAWN_ANGLES[self.rng.gen_range(0..SPAWN_ANGLES.len())];
        let jitter = self.tuning.speed_jitter;
        let speed = self.tuning.base_speed * self.rng.gen_range((1.0 - jitter)..=(1.0 + jitter));

        let puck = Puck::new(
            Uuid::new_v4(),
            PuckSpawn {
                nickname: nickname.into(),
                color: color.into(),
                pos,
                angle,
                speed,
            },
            &self.tuning,
            scale,
        );
        let view = PuckView::from(&puck);
        info!(
            puck_id = %view.id,
            nickname = %view.nickname,
            x = pos.x,
            y = pos.y,
            angle,
            speed,
            "puck spawned"
        );
        self.pucks.push(puck);
        self.rescale();
        view
    }

    /// Removes a puck and re-applies the population rescale to the rest.
    pub fn remove_puck(&mut self, id: PuckId) -> Option<Puck> {
        let index = self.pucks.iter().position(|p| p.id() == id)?;
        let puck = self.pucks.remove(index);
        info!(puck_id = %id, nickname = puck.nickname(), "puck removed");
        self.rescale();
        Some(puck)
    }

    pub fn set_color(&mut self, id: PuckId, color: impl Into<String>) -> bool {
        match self.puck_mut(id) {
            Some(puck) => {
                puck.set_color(color);
                true
            }
            None => false,
        }
    }

    /// Advances the board by `dt` seconds and returns the resulting snapshot.
    ///
    /// Phases run to completion across all pucks before the next starts: integration,
    /// then walls, then pairwise collisions.
    pub fn update(&mut self, dt: f64) -> Snapshot {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        for puck in &mut self.pucks {
            movement::integrate(puck, dt);
        }

        for puck in &mut self.pucks {
            movement::bounce_off_walls(puck, &self.arena);
        }

        collisions::resolve_all(&mut self.pucks, &self.arena);

        self.snapshot()
    }

    /// Motion for every puck plus whatever changed since the previous snapshot.
    pub fn snapshot(&mut self) -> Snapshot {
        let pucks = self
            .pucks
            .iter_mut()
            .map(|puck| {
                let changed = puck.take_changed();
                PuckUpdate::from_puck(puck, changed)
            })
            .collect();
        Snapshot { pucks }
    }

    // Global rescale policy: every join and leave recomputes one shared scale from the
    // population and applies it to all pucks, existing ones included. There is no
    // per-spawn scale that survives later population changes.
    fn rescale(&mut self) {
        self.global_scale = self.tuning.scale_for_population(self.pucks.len());
        for puck in &mut self.pucks {
            puck.set_global_scale(self.global_scale);
            // Growing after a leave may push a puck past a wall.
            collisions::contain(puck, &self.arena);
        }
    }

    fn spawn_coordinate(&mut self, extent: f64, half: f64) -> f64 {
        let margin = extent * self.tuning.spawn_margin;
        let (min, max) = (margin + half, extent - margin - half);
        if min <= max {
            self.rng.gen_range(min..=max)
        } else {
            extent / 2.0
        }
    }

    #[cfg(test)]
    pub(crate) fn place(&mut self, id: PuckId, pos: Point, angle: f64, speed: f64) {
        if let Some(puck) = self.puck_mut(id) {
            puck.set_position(pos);
            puck.set_speed(speed);
            puck.set_angle(angle);
        }
    }
}
