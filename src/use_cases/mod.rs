// Use cases layer: application workflows for the game server.

pub mod ports;
pub mod registry;
pub mod simulation;
pub mod types;
pub mod world;

pub use ports::NoticeEncoder;
pub use registry::{Connection, ConnectionId, ConnectionRegistry, Outbound, Role};
pub use simulation::Simulation;
pub use types::{GameEvent, Notice, TickReport};
pub use world::{World, world_task};
