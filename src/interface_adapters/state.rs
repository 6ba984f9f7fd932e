use crate::use_cases::GameEvent;
use tokio::sync::mpsc;

#[derive(Clone)]
pub struct AppState {
    // Lifecycle events flowing from connection tasks into the world task.
    pub events_tx: mpsc::Sender<GameEvent>,
}
