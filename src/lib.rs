pub mod domain;
pub mod frameworks;
pub mod interface_adapters;
pub mod use_cases;

pub use frameworks::config::{WS_PATH, http_port};
pub use frameworks::server::{init_runtime, run, run_with_config};
pub use interface_adapters::clients::{ClientPredictor, GameClient};
pub use interface_adapters::protocol::{ClientMessage, ServerMessage};
