// Interface adapters: wire protocol, network handling, and the observer client.

pub mod clients;
pub mod net;
pub mod protocol;
pub mod state;
pub mod utils;
