// Per-tick physics rules, applied by the simulation in strict phase order.

pub mod collisions;
pub mod movement;
