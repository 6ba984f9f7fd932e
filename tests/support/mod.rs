// Shared helpers: one server per test binary, plus message helpers for WebSocket clients.
#![allow(dead_code)]

use corner_hits::{GameClient, ServerMessage, WS_PATH};
use std::{
    sync::{Arc, OnceLock},
    time::Duration,
};

// WebSocket URL published once the server thread has bound its port.
static SERVER_URL: OnceLock<String> = OnceLock::new();
static SERVER_READY: OnceLock<()> = OnceLock::new();

pub const RECV_TIMEOUT: Duration = Duration::from_secs(3);

/// Starts the shared server on first use and returns its WebSocket URL.
pub fn ensure_server() -> &'static str {
    SERVER_READY.get_or_init(|| {
        let published_addr = Arc::new(OnceLock::<String>::new());
        let published_addr_thread = Arc::clone(&published_addr);
        // The server gets its own OS thread and runtime so it outlives each
        // `#[tokio::test]` runtime.
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("test runtime");
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("bind ephemeral test port");
                let addr = listener.local_addr().expect("get local addr");
                let _ = published_addr_thread.set(addr.to_string());
                corner_hits::run(listener).await.expect("server failed");
            });
        });
        wait_for_readiness(published_addr);
    });

    SERVER_URL
        .get()
        .expect("server url should be initialized")
        .as_str()
}

fn wait_for_readiness(published_addr: Arc<OnceLock<String>>) {
    let addr = loop {
        if let Some(addr) = published_addr.get() {
            break addr.clone();
        }
        std::thread::sleep(Duration::from_millis(10));
    };

    let _ = SERVER_URL.set(format!("ws://{addr}{WS_PATH}"));

    for _ in 0..100 {
        if std::net::TcpStream::connect(&addr).is_ok() {
            return;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    panic!("server did not become ready in time");
}

/// Connects a fresh client and consumes its `spectator_init`.
pub async fn spectator() -> (GameClient, ServerMessage) {
    let mut client = GameClient::connect(ensure_server())
        .await
        .expect("connect");
    let init = next_non_state(&mut client).await;
    assert!(
        matches!(init, ServerMessage::SpectatorInit { .. }),
        "expected spectator_init, got {init:?}"
    );
    (client, init)
}

/// Next message that is not a per-tick `state`. Other tests share the board, so state
/// traffic can arrive at any time.
pub async fn next_non_state(client: &mut GameClient) -> ServerMessage {
    tokio::time::timeout(RECV_TIMEOUT, async {
        loop {
            match client.next_message().await.expect("server message") {
                ServerMessage::State { .. } => continue,
                other => return other,
            }
        }
    })
    .await
    .expect("timed out waiting for message")
}

/// Waits for a non-state message matching `pred`, skipping unrelated lifecycle traffic
/// from concurrent tests.
pub async fn wait_for(
    client: &mut GameClient,
    mut pred: impl FnMut(&ServerMessage) -> bool,
) -> ServerMessage {
    tokio::time::timeout(RECV_TIMEOUT, async {
        loop {
            let msg = client.next_message().await.expect("server message");
            if pred(&msg) {
                return msg;
            }
        }
    })
    .await
    .expect("timed out waiting for message")
}

/// Asserts nothing matching `pred` arrives within `window`.
pub async fn assert_silent(
    client: &mut GameClient,
    window: Duration,
    mut pred: impl FnMut(&ServerMessage) -> bool,
) {
    let _ = tokio::time::timeout(window, async {
        loop {
            let msg = client.next_message().await.expect("server message");
            assert!(!pred(&msg), "unexpected message {msg:?}");
        }
    })
    .await;
}
