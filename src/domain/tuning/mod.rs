// Gameplay tuning, kept apart from runtime/server configuration.

pub mod puck;

pub use puck::PuckTuning;
