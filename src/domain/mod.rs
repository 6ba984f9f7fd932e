// Domain layer: core simulation types and rules.

pub mod arena;
pub mod point;
pub mod puck;
pub mod state;
pub mod systems;
pub mod tuning;

pub use arena::Arena;
pub use point::{Axis, Point};
pub use puck::{ChangedFields, Puck, PuckId, PuckSpawn};
pub use state::{PuckUpdate, PuckView, Snapshot};
