// Headless observer: mirrors the board locally and logs the corner-hit leaderboard.
//
// Options come from `--url`, `--nickname`, `--color` or the matching OBSERVER_* env vars.
// With both a nickname and a color set, the observer joins as a player.

use clap::Parser;
use corner_hits::{ClientPredictor, GameClient, ServerMessage, WS_PATH};
use serde_json::{Value, json};
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{info, warn};

const PREDICT_INTERVAL: Duration = Duration::from_micros(1_000_000 / 60);
const PING_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless corner_hits observer", long_about = None)]
struct Args {
    /// WebSocket URL of the game server
    #[arg(long, env = "OBSERVER_URL")]
    url: Option<String>,

    /// Nickname to join with; needs --color as well
    #[arg(long, env = "OBSERVER_NICKNAME")]
    nickname: Option<String>,

    /// Puck color to join with; needs --nickname as well
    #[arg(long, env = "OBSERVER_COLOR")]
    color: Option<String>,
}

impl Args {
    fn url(&self) -> String {
        self.url.clone().unwrap_or_else(|| {
            let port = corner_hits::http_port();
            format!("ws://127.0.0.1:{port}{WS_PATH}")
        })
    }
}

#[tokio::main]
async fn main() {
    corner_hits::init_runtime();
    let args = Args::parse();
    let url = args.url();

    let mut client = match GameClient::connect(&url).await {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(%url, error = %e, "failed to connect");
            return;
        }
    };
    info!(%url, "observer connected");

    if let (Some(nickname), Some(color)) = (&args.nickname, &args.color) {
        if let Err(e) = client.join(nickname, color).await {
            tracing::error!(error = %e, "failed to send join");
            return;
        }
    }

    let started = Instant::now();
    let mut predictor = ClientPredictor::new();

    let mut predict = tokio::time::interval(PREDICT_INTERVAL);
    predict.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut last_predict = Instant::now();
    let mut ping = tokio::time::interval(PING_INTERVAL);
    ping.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                info!("observer stopping");
                break;
            }
            msg = client.next_message() => {
                let msg = match msg {
                    Ok(msg) => msg,
                    Err(e) => {
                        warn!(error = %e, "connection lost");
                        break;
                    }
                };
                if let ServerMessage::Pong { ts } = &msg {
                    log_rtt(ts, started);
                }
                if predictor.handle(&msg) {
                    log_leaderboard(&predictor);
                }
            }
            _ = predict.tick() => {
                let now = Instant::now();
                predictor.predict(now.duration_since(last_predict).as_secs_f64());
                last_predict = now;
            }
            _ = ping.tick() => {
                let ts = json!(started.elapsed().as_millis() as u64);
                if let Err(e) = client.ping(ts).await {
                    warn!(error = %e, "failed to send ping");
                    break;
                }
            }
        }
    }

    if let Err(e) = client.close().await {
        tracing::debug!(error = %e, "close failed");
    }
}

fn log_rtt(ts: &Value, started: Instant) {
    let Some(sent_ms) = ts.as_u64() else {
        return;
    };
    let now_ms = started.elapsed().as_millis() as u64;
    info!(rtt_ms = now_ms.saturating_sub(sent_ms), "pong");
}

fn log_leaderboard(predictor: &ClientPredictor) {
    let board: Vec<String> = predictor
        .leaderboard()
        .iter()
        .map(|entry| format!("{}={}", entry.nickname, entry.corner_hits))
        .collect();
    info!(
        players = board.len(),
        own = ?predictor.own_id(),
        leaderboard = %board.join(" "),
        "leaderboard"
    );
}
