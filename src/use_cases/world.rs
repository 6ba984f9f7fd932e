use super::ports::NoticeEncoder;
use super::registry::{ConnectionId, ConnectionRegistry, Outbound};
use super::simulation::Simulation;
use super::types::{GameEvent, Notice, TickReport};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, mpsc};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Owns the simulation and the connection registry. All lifecycle events and ticks are
/// applied here, one at a time, so no state is ever shared across tasks.
pub struct World<E> {
    sim: Simulation,
    registry: ConnectionRegistry,
    encoder: E,
    // Population seen by the previous tick; drives `state` suppression.
    last_population: usize,
}

impl<E: NoticeEncoder> World<E> {
    pub fn new(sim: Simulation, encoder: E) -> Self {
        Self {
            sim,
            registry: ConnectionRegistry::new(),
            encoder,
            last_population: 0,
        }
    }

    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    pub fn handle(&mut self, event: GameEvent) {
        match event {
            GameEvent::Connect { conn_id, outbound } => self.connect(conn_id, outbound),
            GameEvent::Join {
                conn_id,
                nickname,
                color,
            } => self.join(conn_id, nickname, color),
            GameEvent::Leave { conn_id } => self.leave(conn_id),
            GameEvent::ChangeColor { conn_id, color } => self.change_color(conn_id, color),
            GameEvent::Disconnect { conn_id } => self.disconnect(conn_id),
        }
    }

    fn connect(&mut self, conn_id: ConnectionId, outbound: Outbound) {
        if !self.registry.register(conn_id, outbound) {
            warn!(conn_id, "duplicate connection id ignored");
            return;
        }
        info!(conn_id, connections = self.registry.len(), "spectator connected");
        let init = Notice::SpectatorInit {
            pucks: self.sim.views(),
            arena: *self.sim.arena(),
        };
        self.send_to(conn_id, &init);
    }

    fn join(&mut self, conn_id: ConnectionId, nickname: String, color: String) {
        if !self.registry.can_join(conn_id) {
            debug!(conn_id, "join ignored: not a spectator");
            return;
        }

        let view = self.sim.add_puck(nickname, color);
        if !self.registry.bind(conn_id, view.id) {
            // Unreachable while puck ids are fresh; undo rather than leave an orphan.
            warn!(conn_id, puck_id = %view.id, "failed to bind new puck");
            self.sim.remove_puck(view.id);
            return;
        }
        info!(conn_id, puck_id = %view.id, population = self.sim.population(), "player joined");

        self.send_to(conn_id, &Notice::PlayerInit(view.clone()));
        self.broadcast_except(conn_id, &Notice::NewPlayer(view));
    }

    fn leave(&mut self, conn_id: ConnectionId) {
        let Some(puck_id) = self.registry.get(conn_id).and_then(|c| c.owned_puck()) else {
            debug!(conn_id, "leave ignored: no owned puck");
            return;
        };

        self.sim.remove_puck(puck_id);
        self.broadcast_except(conn_id, &Notice::PlayerLeft(puck_id));
        self.registry.unbind(conn_id);
        info!(conn_id, %puck_id, population = self.sim.population(), "player left");
        self.send_to(conn_id, &Notice::SpectatorMode);
    }

    fn change_color(&mut self, conn_id: ConnectionId, color: String) {
        let Some(puck_id) = self.registry.get(conn_id).and_then(|c| c.owned_puck()) else {
            debug!(conn_id, "color change ignored: no owned puck");
            return;
        };
        self.sim.set_color(puck_id, color);
    }

    fn disconnect(&mut self, conn_id: ConnectionId) {
        let Some(conn) = self.registry.deregister(conn_id) else {
            return;
        };
        if let Some(puck_id) = conn.owned_puck() {
            self.sim.remove_puck(puck_id);
        }
        info!(
            conn_id,
            connections = self.registry.len(),
            population = self.sim.population(),
            "connection closed"
        );
    }

    /// One broadcaster step: drop dead transports, advance the board, fan out `state`.
    pub fn tick(&mut self, dt: f64) -> TickReport {
        let mut report = TickReport::default();

        for conn in self.registry.evict_closed() {
            report.evicted += 1;
            if let Some(puck_id) = conn.owned_puck() {
                self.sim.remove_puck(puck_id);
            }
            info!(conn_id = conn.id(), "evicted closed connection");
        }

        let snapshot = self.sim.update(dt);
        report.population = snapshot.population();

        // Stay quiet while the board is empty, but always send the first empty state so
        // clients see the last puck disappear.
        let send = report.population > 0 || self.last_population > 0;
        self.last_population = report.population;
        if !send {
            return report;
        }

        report.state_sent = true;
        report.recipients = self.broadcast(&Notice::State(snapshot));
        report
    }

    fn encode(&self, notice: &Notice) -> Option<axum::extract::ws::Utf8Bytes> {
        self.encoder
            .encode(notice)
            .inspect_err(|e| warn!(kind = notice.kind(), error = %e, "failed to encode notice"))
            .ok()
    }

    fn send_to(&self, conn_id: ConnectionId, notice: &Notice) {
        let Some(conn) = self.registry.get(conn_id) else {
            return;
        };
        if let Some(bytes) = self.encode(notice) {
            if !conn.send(bytes) {
                debug!(conn_id, kind = notice.kind(), "send to closed connection");
            }
        }
    }

    fn broadcast_except(&self, skip: ConnectionId, notice: &Notice) -> usize {
        let Some(bytes) = self.encode(notice) else {
            return 0;
        };
        self.registry
            .iter()
            .filter(|c| c.id() != skip)
            .filter(|c| c.send(bytes.clone()))
            .count()
    }

    fn broadcast(&self, notice: &Notice) -> usize {
        let Some(bytes) = self.encode(notice) else {
            return 0;
        };
        self.registry.iter().filter(|c| c.send(bytes.clone())).count()
    }
}

/// Drives a [`World`]: events are applied as they arrive, ticks run on a wall-clock
/// interval with the measured elapsed time as the step.
pub async fn world_task<E>(
    mut world: World<E>,
    mut events_rx: mpsc::Receiver<GameEvent>,
    tick_interval: Duration,
    shutdown: Arc<Notify>,
) where
    E: NoticeEncoder,
{
    let mut interval = tokio::time::interval(tick_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_tick = Instant::now();

    info!(tick_ms = tick_interval.as_millis() as u64, "world task started");

    loop {
        tokio::select! {
            _ = shutdown.notified() => {
                break;
            }
            event = events_rx.recv() => {
                match event {
                    Some(event) => world.handle(event),
                    // Every sender is gone: the server is shutting down.
                    None => break,
                }
            }
            _ = interval.tick() => {
                let now = Instant::now();
                let dt = now.duration_since(last_tick).as_secs_f64();
                last_tick = now;
                world.tick(dt);
            }
        }
    }

    info!(
        connections = world.registry().len(),
        population = world.simulation().population(),
        "world task stopped"
    );
}
