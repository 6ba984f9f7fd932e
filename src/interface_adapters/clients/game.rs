use crate::interface_adapters::protocol::{ClientMessage, ServerMessage};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::debug;

#[derive(Debug)]
pub enum ClientError {
    Ws(tungstenite::Error),
    Serialization(serde_json::Error),
    // The server closed the socket (or the stream ended).
    Closed,
}

impl From<tungstenite::Error> for ClientError {
    fn from(e: tungstenite::Error) -> Self {
        ClientError::Ws(e)
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::Serialization(e)
    }
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::Ws(e) => write!(f, "websocket error: {e}"),
            ClientError::Serialization(e) => write!(f, "invalid message: {e}"),
            ClientError::Closed => write!(f, "connection closed"),
        }
    }
}

/// Thin tokio-tungstenite client speaking the game's JSON protocol.
pub struct GameClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl GameClient {
    pub async fn connect(url: &str) -> Result<Self, ClientError> {
        let (stream, _response) = tokio_tungstenite::connect_async(url).await?;
        debug!(%url, "connected to game server");
        Ok(Self { stream })
    }

    pub async fn send(&mut self, msg: &ClientMessage) -> Result<(), ClientError> {
        let txt = serde_json::to_string(msg)?;
        self.send_raw(txt).await
    }

    /// Sends an arbitrary text frame, valid protocol or not.
    pub async fn send_raw(&mut self, txt: impl Into<String>) -> Result<(), ClientError> {
        self.stream.send(Message::text(txt.into())).await?;
        Ok(())
    }

    pub async fn send_binary(&mut self, bytes: Vec<u8>) -> Result<(), ClientError> {
        self.stream.send(Message::binary(bytes)).await?;
        Ok(())
    }

    pub async fn join(&mut self, nickname: &str, color: &str) -> Result<(), ClientError> {
        self.send(&ClientMessage::Join {
            nickname: nickname.to_string(),
            color: color.to_string(),
        })
        .await
    }

    pub async fn leave(&mut self) -> Result<(), ClientError> {
        self.send(&ClientMessage::Leave).await
    }

    pub async fn change_color(&mut self, color: &str) -> Result<(), ClientError> {
        self.send(&ClientMessage::NewColor {
            color: color.to_string(),
        })
        .await
    }

    pub async fn ping(&mut self, ts: Value) -> Result<(), ClientError> {
        self.send(&ClientMessage::Ping { ts }).await
    }

    /// Waits for the next protocol message, skipping control frames.
    pub async fn next_message(&mut self) -> Result<ServerMessage, ClientError> {
        loop {
            let Some(frame) = self.stream.next().await else {
                return Err(ClientError::Closed);
            };
            match frame? {
                Message::Text(text) => return Ok(serde_json::from_str(text.as_str())?),
                Message::Close(_) => return Err(ClientError::Closed),
                Message::Binary(_) | Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
            }
        }
    }

    pub async fn close(mut self) -> Result<(), ClientError> {
        self.stream.close(None).await?;
        Ok(())
    }
}
