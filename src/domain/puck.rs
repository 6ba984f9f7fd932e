// Puck entity: the avatar a player controls on the board.
//
// Stored fields with dependents (speed/angle -> velocity, scale -> size) are private and
// only change through mutators that refresh the derived values in the same call.

use super::point::{Axis, Point};
use super::tuning::PuckTuning;
use uuid::Uuid;

pub type PuckId = Uuid;

/// Fields that changed since the last snapshot, beyond position and velocity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangedFields {
    pub color: bool,
    pub size: bool,
    pub corner_hits: bool,
}

impl ChangedFields {
    pub fn is_empty(&self) -> bool {
        !(self.color || self.size || self.corner_hits)
    }
}

/// Initial placement and motion for a new puck.
#[derive(Debug, Clone)]
pub struct PuckSpawn {
    pub nickname: String,
    pub color: String,
    pub pos: Point,
    /// Heading in degrees; 0 points along +X, 90 along +Y.
    pub angle: f64,
    pub speed: f64,
}

#[derive(Debug, Clone)]
pub struct Puck {
    id: PuckId,
    nickname: String,
    color: String,
    pos: Point,
    velocity: Point,

    // Size = base_size * global_scale * scale.
    base_size: Point,
    global_scale: f64,
    scale: f64,
    size: Point,

    speed: f64,
    angle: f64,
    max_speed: f64,
    max_scale: f64,

    corner_hits: u32,
    changed: ChangedFields,
}

impl Puck {
    pub fn new(id: PuckId, spawn: PuckSpawn, tuning: &PuckTuning, global_scale: f64) -> Self {
        let mut puck = Self {
            id,
            nickname: spawn.nickname,
            color: spawn.color,
            pos: spawn.pos,
            velocity: Point::ZERO,
            base_size: Point::new(tuning.base_width, tuning.base_height),
            global_scale,
            scale: 1.0,
            size: Point::ZERO,
            speed: spawn.speed.clamp(0.0, tuning.max_speed),
            angle: 0.0,
            max_speed: tuning.max_speed,
            max_scale: tuning.max_scale,
            corner_hits: 0,
            changed: ChangedFields::default(),
        };
        puck.refresh_size();
        puck.set_angle(spawn.angle);
        puck
    }

    pub fn id(&self) -> PuckId {
        self.id
    }

    pub fn nickname(&self) -> &str {
        &self.nickname
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn pos(&self) -> Point {
        self.pos
    }

    pub fn velocity(&self) -> Point {
        self.velocity
    }

    /// Full extent of the bounding box.
    pub fn size(&self) -> Point {
        self.size
    }

    pub fn half_extents(&self) -> Point {
        self.size * 0.5
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn corner_hits(&self) -> u32 {
        self.corner_hits
    }

    pub fn changed(&self) -> ChangedFields {
        self.changed
    }

    /// Sets the scalar speed and re-derives velocity. Out-of-range values are ignored.
    pub fn set_speed(&mut self, speed: f64) -> bool {
        if !(0.0..=self.max_speed).contains(&speed) {
            return false;
        }
        self.speed = speed;
        self.refresh_velocity();
        true
    }

    /// Sets the heading in degrees (wrapped into [0, 360)) and re-derives velocity.
    pub fn set_angle(&mut self, degrees: f64) {
        if !degrees.is_finite() {
            return;
        }
        self.angle = degrees.rem_euclid(360.0);
        self.refresh_velocity();
    }

    /// Sets this puck's own size multiplier. Values outside (0, max_scale] are ignored.
    pub fn set_scale(&mut self, scale: f64) -> bool {
        if !(scale > 0.0 && scale <= self.max_scale) {
            return false;
        }
        self.scale = scale;
        self.refresh_size();
        true
    }

    /// Applies the board-wide scale shared by every puck.
    pub fn set_global_scale(&mut self, global_scale: f64) {
        self.global_scale = global_scale;
        self.refresh_size();
    }

    pub fn set_color(&mut self, color: impl Into<String>) {
        self.color = color.into();
        self.changed.color = true;
    }

    pub(crate) fn advance(&mut self, dt: f64) {
        self.pos = self.pos + self.velocity * dt;
    }

    pub(crate) fn set_position(&mut self, pos: Point) {
        self.pos = pos;
    }

    pub(crate) fn set_axis_position(&mut self, axis: Axis, value: f64) {
        self.pos.set(axis, value);
    }

    /// Writes one axis of position and velocity together, as a wall bounce resolves them.
    pub(crate) fn set_axis_motion(&mut self, axis: Axis, pos: f64, vel: f64) {
        self.pos.set(axis, pos);
        self.velocity.set(axis, vel);
    }

    /// Negates one velocity component; speed and angle are left as they were.
    pub(crate) fn invert_velocity(&mut self, axis: Axis) {
        self.velocity.set(axis, -self.velocity.get(axis));
    }

    pub(crate) fn record_corner_hit(&mut self) {
        self.corner_hits += 1;
        self.changed.corner_hits = true;
    }

    /// Returns the pending changes and clears them.
    pub(crate) fn take_changed(&mut self) -> ChangedFields {
        std::mem::take(&mut self.changed)
    }

    fn refresh_velocity(&mut self) {
        let radians = self.angle.to_radians();
        self.velocity = Point::new(self.speed * radians.cos(), self.speed * radians.sin());
    }

    fn refresh_size(&mut self) {
        let factor = self.global_scale * self.scale;
        self.size = Point::new(self.base_size.x * factor, self.base_size.y * factor);
        self.changed.size = true;
    }
}
