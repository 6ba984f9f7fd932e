// Outbound clients: the WebSocket game client and its local board predictor.

pub mod game;
pub mod predictor;

pub use game::{ClientError, GameClient};
pub use predictor::{ClientPredictor, LeaderboardEntry, PredictedPuck};
