// Framework bootstrap for the game server runtime.

use crate::frameworks::config;
use crate::interface_adapters::net::ws_handler;
use crate::interface_adapters::protocol::JsonEncoder;
use crate::interface_adapters::state::AppState;
use crate::use_cases::{GameEvent, Simulation, World, world_task};

use axum::{Router, routing::get};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::net::SocketAddr;
use std::{io::Result, sync::Arc};
use tokio::sync::{Notify, mpsc};

/// Loads `.env`, installs the tracing subscriber and the panic hook. Call once per process.
pub fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

/// Serves the game on `listener` until the process receives Ctrl-C.
pub async fn run(listener: tokio::net::TcpListener) -> Result<()> {
    let address = listener.local_addr()?;
    let shutdown = Arc::new(Notify::new());
    let state = build_state(shutdown.clone());

    let app = Router::new()
        .route(config::WS_PATH, get(ws_handler))
        .with_state(state);

    tracing::info!(%address, path = config::WS_PATH, "listening");

    // Serve app and report errors rather than panicking
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await
        .inspect_err(|e| {
            tracing::error!(error = %e, "server error");
        })
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let address = SocketAddr::new(config::host(), config::http_port());

    // Bind TCP listener with error handling
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .inspect_err(|e| {
            tracing::error!(%address, error = %e, "failed to bind");
        })?;

    run(listener).await
}

fn build_state(shutdown: Arc<Notify>) -> Arc<AppState> {
    let arena = config::arena();
    let tuning = config::puck_tuning();
    let tick_interval = config::tick_interval();
    tracing::debug!(
        width = arena.width,
        height = arena.height,
        corner_tolerance = arena.corner_tolerance,
        base_speed = tuning.base_speed,
        tick_ms = tick_interval.as_millis() as u64,
        "board configured"
    );

    // events_tx/rx: every connection task feeds the single world task.
    let (events_tx, events_rx) = mpsc::channel::<GameEvent>(config::EVENT_CHANNEL_CAPACITY);

    let sim = Simulation::new(arena, tuning, StdRng::from_entropy());
    let world = World::new(sim, JsonEncoder);

    // The world task owns the board, the registry, and the tick timer.
    tokio::spawn(world_task(world, events_rx, tick_interval, shutdown));

    Arc::new(AppState { events_tx })
}

async fn shutdown_signal(shutdown: Arc<Notify>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        // Without a signal handler, keep serving.
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
    shutdown.notify_one();
}
