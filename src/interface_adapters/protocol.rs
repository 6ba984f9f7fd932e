// Wire protocol DTOs and conversions for the public WebSocket messages.
// Every frame is a JSON object tagged by `type`; field names are camelCase.

use crate::domain::{Arena, Point, PuckId, PuckUpdate, PuckView};
use crate::use_cases::{Notice, NoticeEncoder};
use axum::extract::ws::Utf8Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Longest nickname or color accepted from a client, in characters.
pub const MAX_FIELD_CHARS: usize = 32;

/// Messages the server sends to connected clients over the WebSocket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    // Sent once on connect: every live puck plus the board size.
    SpectatorInit {
        players: Vec<PuckRecord>,
        board: BoardDto,
    },
    // The requester's own puck after an accepted join.
    PlayerInit { player: PuckRecord },
    // Someone else joined.
    NewPlayer { player: PuckRecord },
    // Someone else left.
    PlayerLeft { player_id: PuckId },
    // The requester is a spectator again.
    SpectatorMode,
    // Per-tick snapshot.
    State { players: Vec<PartialPuckRecord> },
    // Echo of a client ping.
    Pong {
        #[serde(default)]
        ts: Value,
    },
}

/// Messages the client sends to the server over the WebSocket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Join { nickname: String, color: String },
    Leave,
    NewColor { color: String },
    Ping {
        #[serde(default)]
        ts: Value,
    },
}

impl ClientMessage {
    /// Trims and bounds the free-text fields. Returns `None` when a required field is
    /// blank, which makes the whole message malformed.
    pub fn sanitized(self) -> Option<Self> {
        match self {
            ClientMessage::Join { nickname, color } => Some(ClientMessage::Join {
                nickname: clean_field(&nickname)?,
                color: clean_field(&color)?,
            }),
            ClientMessage::NewColor { color } => Some(ClientMessage::NewColor {
                color: clean_field(&color)?,
            }),
            other => Some(other),
        }
    }
}

fn clean_field(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(MAX_FIELD_CHARS).collect())
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointDto {
    pub x: f64,
    pub y: f64,
}

impl From<Point> for PointDto {
    fn from(p: Point) -> Self {
        Self { x: p.x, y: p.y }
    }
}

impl From<PointDto> for Point {
    fn from(p: PointDto) -> Self {
        Point::new(p.x, p.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoardDto {
    pub width: f64,
    pub height: f64,
}

impl From<&Arena> for BoardDto {
    fn from(arena: &Arena) -> Self {
        Self {
            width: arena.width,
            height: arena.height,
        }
    }
}

/// Full public state of one puck. `size` is the full extent, not the half extent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PuckRecord {
    pub id: PuckId,
    pub nickname: String,
    pub color: String,
    pub pos: PointDto,
    pub velocity: PointDto,
    pub size: PointDto,
    pub corner_hits: u32,
}

impl From<&PuckView> for PuckRecord {
    fn from(view: &PuckView) -> Self {
        Self {
            id: view.id,
            nickname: view.nickname.clone(),
            color: view.color.clone(),
            pos: view.pos.into(),
            velocity: view.velocity.into(),
            size: view.size.into(),
            corner_hits: view.corner_hits,
        }
    }
}

/// Per-tick puck entry: motion always present, the rest only when it changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialPuckRecord {
    pub id: PuckId,
    pub pos: PointDto,
    pub velocity: PointDto,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<PointDto>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corner_hits: Option<u32>,
}

impl From<&PuckUpdate> for PartialPuckRecord {
    fn from(update: &PuckUpdate) -> Self {
        Self {
            id: update.id,
            pos: update.pos.into(),
            velocity: update.velocity.into(),
            color: update.color.clone(),
            size: update.size.map(PointDto::from),
            corner_hits: update.corner_hits,
        }
    }
}

impl From<&Notice> for ServerMessage {
    fn from(notice: &Notice) -> Self {
        match notice {
            Notice::SpectatorInit { pucks, arena } => ServerMessage::SpectatorInit {
                players: pucks.iter().map(PuckRecord::from).collect(),
                board: arena.into(),
            },
            Notice::PlayerInit(view) => ServerMessage::PlayerInit {
                player: view.into(),
            },
            Notice::NewPlayer(view) => ServerMessage::NewPlayer {
                player: view.into(),
            },
            Notice::PlayerLeft(id) => ServerMessage::PlayerLeft { player_id: *id },
            Notice::SpectatorMode => ServerMessage::SpectatorMode,
            Notice::State(snapshot) => ServerMessage::State {
                players: snapshot.pucks.iter().map(PartialPuckRecord::from).collect(),
            },
        }
    }
}

pub fn encode(msg: &ServerMessage) -> Result<Utf8Bytes, serde_json::Error> {
    serde_json::to_string(msg).map(Utf8Bytes::from)
}

/// JSON text-frame encoder used by the world task.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEncoder;

impl NoticeEncoder for JsonEncoder {
    fn encode(&self, notice: &Notice) -> Result<Utf8Bytes, String> {
        encode(&ServerMessage::from(notice)).map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Snapshot;
    use serde_json::json;
    use uuid::Uuid;

    fn to_value(notice: &Notice) -> Value {
        let bytes = JsonEncoder.encode(notice).expect("encodes");
        serde_json::from_str(bytes.as_str()).expect("valid json")
    }

    fn view(id: PuckId) -> PuckView {
        PuckView {
            id,
            nickname: "Ada".to_string(),
            color: "#ff6b6b".to_string(),
            pos: Point::new(10.0, 20.0),
            velocity: Point::new(-3.0, 4.0),
            size: Point::new(300.0, 200.0),
            corner_hits: 2,
        }
    }

    #[test]
    fn puck_record_uses_camel_case_and_full_size() {
        let id = Uuid::new_v4();
        let value = to_value(&Notice::PlayerInit(view(id)));
        assert_eq!(
            value,
            json!({
                "type": "player_init",
                "player": {
                    "id": id.to_string(),
                    "nickname": "Ada",
                    "color": "#ff6b6b",
                    "pos": {"x": 10.0, "y": 20.0},
                    "velocity": {"x": -3.0, "y": 4.0},
                    "size": {"x": 300.0, "y": 200.0},
                    "cornerHits": 2
                }
            })
        );
    }

    #[test]
    fn spectator_init_carries_board() {
        let value = to_value(&Notice::SpectatorInit {
            pucks: Vec::new(),
            arena: Arena::default(),
        });
        assert_eq!(value["type"], "spectator_init");
        assert_eq!(value["players"], json!([]));
        assert_eq!(value["board"], json!({"width": 1280.0, "height": 720.0}));
    }

    #[test]
    fn player_left_and_spectator_mode_shapes() {
        let id = Uuid::new_v4();
        assert_eq!(
            to_value(&Notice::PlayerLeft(id)),
            json!({"type": "player_left", "playerId": id.to_string()})
        );
        assert_eq!(
            to_value(&Notice::SpectatorMode),
            json!({"type": "spectator_mode"})
        );
    }

    #[test]
    fn state_omits_unchanged_fields() {
        let id = Uuid::new_v4();
        let snapshot = Snapshot {
            pucks: vec![PuckUpdate {
                id,
                pos: Point::new(1.0, 2.0),
                velocity: Point::new(3.0, 4.0),
                color: None,
                size: None,
                corner_hits: Some(5),
            }],
        };
        let value = to_value(&Notice::State(snapshot));
        let entry = &value["players"][0];
        assert_eq!(entry["cornerHits"], 5);
        let obj = entry.as_object().expect("object");
        assert!(!obj.contains_key("color"));
        assert!(!obj.contains_key("size"));
        assert!(obj.contains_key("pos") && obj.contains_key("velocity"));
    }

    #[test]
    fn client_messages_parse_from_wire_shapes() {
        let join: ClientMessage =
            serde_json::from_str(r##"{"type":"join","nickname":"Ada","color":"#fff"}"##)
                .expect("join");
        assert_eq!(
            join,
            ClientMessage::Join {
                nickname: "Ada".to_string(),
                color: "#fff".to_string()
            }
        );

        let leave: ClientMessage = serde_json::from_str(r#"{"type":"leave"}"#).expect("leave");
        assert_eq!(leave, ClientMessage::Leave);

        let color: ClientMessage =
            serde_json::from_str(r##"{"type":"new_color","color":"#abc"}"##).expect("new_color");
        assert_eq!(
            color,
            ClientMessage::NewColor {
                color: "#abc".to_string()
            }
        );

        let ping: ClientMessage =
            serde_json::from_str(r#"{"type":"ping","ts":{"sent":1700000000123}}"#).expect("ping");
        assert_eq!(
            ping,
            ClientMessage::Ping {
                ts: json!({"sent": 1700000000123u64})
            }
        );
    }

    #[test]
    fn unknown_or_incomplete_client_messages_are_rejected() {
        assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"fly"}"#).is_err());
        assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"join","nickname":"x"}"#).is_err());
        assert!(serde_json::from_str::<ClientMessage>("not json").is_err());
    }

    #[test]
    fn sanitize_trims_truncates_and_rejects_blank() {
        let long = "n".repeat(40);
        let msg = ClientMessage::Join {
            nickname: format!("  {long}  "),
            color: " #123 ".to_string(),
        };
        match msg.sanitized() {
            Some(ClientMessage::Join { nickname, color }) => {
                assert_eq!(nickname.chars().count(), MAX_FIELD_CHARS);
                assert_eq!(color, "#123");
            }
            other => panic!("unexpected {other:?}"),
        }

        let blank = ClientMessage::NewColor {
            color: "   ".to_string(),
        };
        assert!(blank.sanitized().is_none());
        assert_eq!(ClientMessage::Leave.sanitized(), Some(ClientMessage::Leave));
    }

    #[test]
    fn pong_echoes_any_json_value() {
        let msg = ServerMessage::Pong {
            ts: json!([1, "two", null]),
        };
        let bytes = encode(&msg).expect("encodes");
        let back: ServerMessage = serde_json::from_str(bytes.as_str()).expect("decodes");
        assert_eq!(back, msg);
    }
}
