use crate::interface_adapters::protocol::{self, ClientMessage, ServerMessage};
use crate::interface_adapters::state::AppState;
use crate::interface_adapters::utils::ids::next_connection_id;
use crate::use_cases::{ConnectionId, GameEvent};

use axum::{
    Error,
    extract::{
        State,
        ws::{CloseFrame, Message, Utf8Bytes, WebSocket, WebSocketUpgrade, close_code},
    },
    response::IntoResponse,
};
use futures_util::SinkExt;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::mpsc;
use tracing::{Instrument, debug, info, info_span, warn};

#[derive(Debug)]
enum NetError {
    // Categorizes connection lifecycle failures so callers can decide policy.
    #[allow(dead_code)]
    Ws(axum::Error),
    #[allow(dead_code)]
    Serialization(serde_json::Error),
    EventsClosed,
}

impl From<axum::Error> for NetError {
    fn from(e: axum::Error) -> Self {
        NetError::Ws(e)
    }
}

impl From<serde_json::Error> for NetError {
    fn from(e: serde_json::Error) -> Self {
        NetError::Serialization(e)
    }
}

const LOG_THROTTLE: Duration = Duration::from_secs(2);

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let events_tx = state.events_tx.clone();
    ws.on_upgrade(move |socket| {
        let conn_id = next_connection_id();
        handle_socket(socket, conn_id, events_tx).instrument(info_span!("conn", conn_id))
    })
}

async fn handle_socket(
    mut socket: WebSocket,
    conn_id: ConnectionId,
    events_tx: mpsc::Sender<GameEvent>,
) {
    // The world task holds the sending half; this task drains it into the socket.
    let (outbound, outbound_rx) = mpsc::unbounded_channel();

    // Register before reading anything so spectator_init is the first frame out.
    if events_tx
        .send(GameEvent::Connect { conn_id, outbound })
        .await
        .is_err()
    {
        warn!("world task unavailable; refusing connection");
        let _ = socket
            .send(Message::Close(Some(CloseFrame {
                code: close_code::AWAY,
                reason: "server shutting down".into(),
            })))
            .await;
        return;
    }
    info!("client connected");

    let mut ctx = ConnCtx::new(conn_id, events_tx, outbound_rx);

    // Main Client Loop
    if let Err(e) = run_client_loop(&mut socket, &mut ctx).await {
        warn!(error = ?e, "client loop exited with error");
    }
}

struct ConnCtx {
    conn_id: ConnectionId,
    events_tx: mpsc::Sender<GameEvent>,
    // Frames queued by the world task for this socket.
    outbound_rx: mpsc::UnboundedReceiver<Utf8Bytes>,

    msgs_in: u64,
    msgs_out: u64,
    bytes_in: u64,
    bytes_out: u64,

    invalid_msgs: u32,
    last_invalid_log: Instant,

    close_frame: Option<CloseFrame>,
}

impl ConnCtx {
    fn new(
        conn_id: ConnectionId,
        events_tx: mpsc::Sender<GameEvent>,
        outbound_rx: mpsc::UnboundedReceiver<Utf8Bytes>,
    ) -> Self {
        Self {
            conn_id,
            events_tx,
            outbound_rx,
            msgs_in: 0,
            msgs_out: 0,
            bytes_in: 0,
            bytes_out: 0,
            invalid_msgs: 0,
            // Allow the first warning through immediately.
            last_invalid_log: Instant::now() - LOG_THROTTLE,
            close_frame: None,
        }
    }

    fn note_invalid(&mut self) -> bool {
        self.invalid_msgs += 1;
        should_log(&mut self.last_invalid_log)
    }
}

enum LoopControl {
    Continue,
    Disconnect,
}

fn should_log(last: &mut Instant) -> bool {
    if last.elapsed() >= LOG_THROTTLE {
        *last = Instant::now();
        true
    } else {
        false
    }
}

async fn send_message(socket: &mut WebSocket, msg: &ServerMessage) -> Result<usize, NetError> {
    let bytes = protocol::encode(msg)?;
    let len = bytes.len();
    socket.send(Message::Text(bytes)).await?;
    Ok(len)
}

async fn run_client_loop(socket: &mut WebSocket, ctx: &mut ConnCtx) -> Result<(), NetError> {
    let mut fatal: Option<NetError> = None;

    loop {
        // disconnect becomes true on error
        let disconnect: bool = tokio::select! {
            // Incoming Message from Client
            incoming = socket.recv() => {
                match handle_incoming_ws(socket, incoming, ctx).await {
                    Ok(LoopControl::Continue) => false,
                    Ok(LoopControl::Disconnect) => true,
                    Err(e) => {
                        fatal = Some(e);
                        true
                    }
                }
            }

            // Outgoing frames from the world task
            queued = ctx.outbound_rx.recv() => {
                match queued {
                    Some(bytes) => match forward_bytes(bytes, socket, ctx).await {
                        LoopControl::Continue => false,
                        LoopControl::Disconnect => true,
                    },
                    None => {
                        // The world dropped this connection (shutdown).
                        ctx.close_frame = Some(CloseFrame {
                            code: close_code::AWAY,
                            reason: "server shutting down".into(),
                        });
                        true
                    }
                }
            }
        };

        if disconnect {
            if let Some(frame) = ctx.close_frame.take() {
                let _ = socket.send(Message::Close(Some(frame))).await;
            }
            if let Err(err) = socket.close().await.map_err(NetError::Ws) {
                debug!(error = ?err, "socket close error");
            }
            break;
        }
    }

    if let Err(e) = disconnect_cleanup(ctx).await {
        warn!(error = ?e, "error during disconnect cleanup");
        if fatal.is_none() {
            fatal = Some(e);
        }
    }

    match fatal {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

async fn handle_incoming_ws(
    socket: &mut WebSocket,
    incoming: Option<Result<Message, Error>>,
    ctx: &mut ConnCtx,
) -> Result<LoopControl, NetError> {
    let conn_id = ctx.conn_id;
    match incoming {
        Some(Ok(msg)) => match msg {
            Message::Text(text) => {
                ctx.msgs_in += 1;
                ctx.bytes_in += text.len() as u64;

                let parsed = match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(parsed) => parsed,
                    Err(parse_err) => {
                        // Malformed input is dropped; the connection stays open.
                        if ctx.note_invalid() {
                            warn!(
                                conn_id,
                                bytes = text.len(),
                                error = %parse_err,
                                "failed to parse client message"
                            );
                        }
                        return Ok(LoopControl::Continue);
                    }
                };

                let Some(msg) = parsed.sanitized() else {
                    if ctx.note_invalid() {
                        warn!(conn_id, "blank field in client message; dropping");
                    }
                    return Ok(LoopControl::Continue);
                };

                handle_client_message(socket, msg, ctx).await
            }
            Message::Binary(bytes) => {
                if ctx.note_invalid() {
                    warn!(conn_id, bytes = bytes.len(), "binary frame ignored");
                }
                Ok(LoopControl::Continue)
            }
            Message::Ping(_) | Message::Pong(_) => Ok(LoopControl::Continue),
            Message::Close(_) => Ok(LoopControl::Disconnect),
        },
        Some(Err(e)) => {
            warn!(conn_id, error = %e, "websocket recv error");
            Ok(LoopControl::Disconnect)
        }
        None => {
            info!(conn_id, "websocket closed");
            Ok(LoopControl::Disconnect)
        }
    }
}

async fn handle_client_message(
    socket: &mut WebSocket,
    msg: ClientMessage,
    ctx: &mut ConnCtx,
) -> Result<LoopControl, NetError> {
    let conn_id = ctx.conn_id;
    let event = match msg {
        ClientMessage::Ping { ts } => {
            // Answered here: the echo needs no world state.
            return match send_message(socket, &ServerMessage::Pong { ts }).await {
                Ok(bytes) => {
                    ctx.msgs_out += 1;
                    ctx.bytes_out += bytes as u64;
                    Ok(LoopControl::Continue)
                }
                Err(err) => {
                    warn!(error = ?err, "failed to send pong");
                    Ok(LoopControl::Disconnect)
                }
            };
        }
        ClientMessage::Join { nickname, color } => GameEvent::Join {
            conn_id,
            nickname,
            color,
        },
        ClientMessage::Leave => GameEvent::Leave { conn_id },
        ClientMessage::NewColor { color } => GameEvent::ChangeColor { conn_id, color },
    };

    ctx.events_tx
        .send(event)
        .await
        .map_err(|_| NetError::EventsClosed)?;
    Ok(LoopControl::Continue)
}

async fn forward_bytes(bytes: Utf8Bytes, socket: &mut WebSocket, ctx: &mut ConnCtx) -> LoopControl {
    let len = bytes.len();
    match socket.send(Message::Text(bytes)).await.map_err(NetError::Ws) {
        Ok(()) => {
            ctx.msgs_out += 1;
            ctx.bytes_out += len as u64;
            LoopControl::Continue
        }
        Err(err) => {
            // Log unexpected send failures; disconnect will follow immediately.
            warn!(error = ?err, "failed to send queued frame");
            LoopControl::Disconnect
        }
    }
}

async fn disconnect_cleanup(ctx: &mut ConnCtx) -> Result<(), NetError> {
    let conn_id = ctx.conn_id;
    // Stop accepting frames so the world sees the transport as closed even before the
    // Disconnect event lands.
    ctx.outbound_rx.close();

    let sent = ctx
        .events_tx
        .send(GameEvent::Disconnect { conn_id })
        .await
        .map_err(|_| NetError::EventsClosed);

    debug!(
        conn_id,
        msgs_in = ctx.msgs_in,
        msgs_out = ctx.msgs_out,
        bytes_in = ctx.bytes_in,
        bytes_out = ctx.bytes_out,
        invalid_msgs = ctx.invalid_msgs,
        "connection stats"
    );
    info!(conn_id, "client disconnected");
    sent
}
