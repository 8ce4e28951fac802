//! Messages exchanged between duel clients and the relay server
//!
//! Both directions are JSON objects carrying an integer `code`:
//!
//! ```text
//! client -> server  { "code": 0..4, "data"?: Snapshot }
//! server -> client  { "code": 0..2, "self"?: Snapshot, "other"?: Snapshot }
//! ```

use serde::{Deserialize, Serialize};
use tetris_core::Snapshot;

use crate::error::{DuelError, Result};

/// Client to server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawClientMessage", into = "RawClientMessage")]
pub enum ClientMessage {
    /// Take (or take back) a seat in the room
    Join,
    /// Latest local state
    Update(Snapshot),
    /// Give up the seat
    Leave,
    /// Ready to start or resume
    Start,
    /// Ask both players to pause
    Pause,
}

impl ClientMessage {
    pub const JOIN: u8 = 0;
    pub const UPDATE: u8 = 1;
    pub const LEAVE: u8 = 2;
    pub const START: u8 = 3;
    pub const PAUSE: u8 = 4;

    pub fn code(&self) -> u8 {
        match self {
            ClientMessage::Join => Self::JOIN,
            ClientMessage::Update(_) => Self::UPDATE,
            ClientMessage::Leave => Self::LEAVE,
            ClientMessage::Start => Self::START,
            ClientMessage::Pause => Self::PAUSE,
        }
    }

    /// Periodic state samples may be dropped under congestion; everything
    /// else must be delivered
    pub fn is_best_effort(&self) -> bool {
        matches!(self, ClientMessage::Update(_))
    }
}

#[derive(Serialize, Deserialize)]
struct RawClientMessage {
    code: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<Snapshot>,
}

impl TryFrom<RawClientMessage> for ClientMessage {
    type Error = DuelError;

    fn try_from(raw: RawClientMessage) -> Result<Self> {
        match raw.code {
            Self::JOIN => Ok(ClientMessage::Join),
            Self::UPDATE => raw
                .data
                .map(ClientMessage::Update)
                .ok_or_else(|| DuelError::Serialization("update message without data".to_string())),
            Self::LEAVE => Ok(ClientMessage::Leave),
            Self::START => Ok(ClientMessage::Start),
            Self::PAUSE => Ok(ClientMessage::Pause),
            code => Err(DuelError::Serialization(format!("unknown client message code {}", code))),
        }
    }
}

impl From<ClientMessage> for RawClientMessage {
    fn from(message: ClientMessage) -> Self {
        let code = message.code();
        let data = match message {
            ClientMessage::Update(snapshot) => Some(snapshot),
            _ => None,
        };
        RawClientMessage { code, data }
    }
}

/// Server to client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawServerMessage", into = "RawServerMessage")]
pub enum ServerMessage {
    /// Both players are ready: enter `running`
    Start,
    /// Enter `paused`
    Pause,
    /// State of one or both boards
    Update {
        /// The receiver's own last known state, sent after a join
        own: Option<Snapshot>,
        /// The opponent's latest state
        other: Option<Snapshot>,
    },
}

impl ServerMessage {
    pub const START: u8 = 0;
    pub const PAUSE: u8 = 1;
    pub const UPDATE: u8 = 2;

    pub fn code(&self) -> u8 {
        match self {
            ServerMessage::Start => Self::START,
            ServerMessage::Pause => Self::PAUSE,
            ServerMessage::Update { .. } => Self::UPDATE,
        }
    }

    /// Relayed opponent states may be dropped; start, pause and join replies may not
    pub fn is_best_effort(&self) -> bool {
        matches!(self, ServerMessage::Update { own: None, .. })
    }
}

#[derive(Serialize, Deserialize)]
struct RawServerMessage {
    code: u8,
    #[serde(rename = "self", default, skip_serializing_if = "Option::is_none")]
    own: Option<Snapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    other: Option<Snapshot>,
}

impl TryFrom<RawServerMessage> for ServerMessage {
    type Error = DuelError;

    fn try_from(raw: RawServerMessage) -> Result<Self> {
        match raw.code {
            Self::START => Ok(ServerMessage::Start),
            Self::PAUSE => Ok(ServerMessage::Pause),
            Self::UPDATE => Ok(ServerMessage::Update {
                own: raw.own,
                other: raw.other,
            }),
            code => Err(DuelError::Serialization(format!("unknown server message code {}", code))),
        }
    }
}

impl From<ServerMessage> for RawServerMessage {
    fn from(message: ServerMessage) -> Self {
        let code = message.code();
        match message {
            ServerMessage::Update { own, other } => RawServerMessage { code, own, other },
            _ => RawServerMessage {
                code,
                own: None,
                other: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tetris_core::Status;

    fn snapshot(status: Status, score: u32) -> Snapshot {
        Snapshot {
            status,
            score,
            grid: vec![0; 4],
            sprite: None,
        }
    }

    #[test]
    fn test_client_codes() {
        assert_eq!(serde_json::to_value(ClientMessage::Join).unwrap(), json!({"code": 0}));
        assert_eq!(serde_json::to_value(ClientMessage::Leave).unwrap(), json!({"code": 2}));
        assert_eq!(serde_json::to_value(ClientMessage::Start).unwrap(), json!({"code": 3}));
        assert_eq!(serde_json::to_value(ClientMessage::Pause).unwrap(), json!({"code": 4}));

        let update = serde_json::to_value(ClientMessage::Update(snapshot(Status::Running, 50))).unwrap();
        assert_eq!(update["code"], 1);
        assert_eq!(update["data"]["status"], 3);
        assert_eq!(update["data"]["score"], 50);
    }

    #[test]
    fn test_client_decode() {
        let message: ClientMessage = serde_json::from_str(r#"{"code": 3}"#).unwrap();
        assert_eq!(message, ClientMessage::Start);

        let message: ClientMessage =
            serde_json::from_str(r#"{"code": 1, "data": {"status": 2, "score": 0, "grid": []}}"#).unwrap();
        assert_eq!(message, ClientMessage::Update(Snapshot {
            status: Status::Starting,
            score: 0,
            grid: vec![],
            sprite: None,
        }));
    }

    #[test]
    fn test_client_decode_rejects_malformed() {
        assert!(serde_json::from_str::<ClientMessage>(r#"{"code": 1}"#).is_err());
        assert!(serde_json::from_str::<ClientMessage>(r#"{"code": 7}"#).is_err());
        assert!(serde_json::from_str::<ClientMessage>(r#"{"data": null}"#).is_err());
        assert!(serde_json::from_str::<ClientMessage>("not json").is_err());
    }

    #[test]
    fn test_server_update_fields() {
        let message = ServerMessage::Update {
            own: Some(snapshot(Status::Paused, 100)),
            other: Some(snapshot(Status::Running, 0)),
        };
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["code"], 2);
        assert_eq!(value["self"]["status"], 1);
        assert_eq!(value["other"]["status"], 3);

        let relay = serde_json::to_value(ServerMessage::Update {
            own: None,
            other: Some(snapshot(Status::Running, 0)),
        })
        .unwrap();
        assert!(relay.get("self").is_none());

        let decoded: ServerMessage = serde_json::from_value(value).unwrap();
        assert_eq!(decoded, message);
    }

    #[test]
    fn test_server_control_codes() {
        assert_eq!(serde_json::to_value(ServerMessage::Start).unwrap(), json!({"code": 0}));
        assert_eq!(serde_json::to_value(ServerMessage::Pause).unwrap(), json!({"code": 1}));
        assert!(serde_json::from_str::<ServerMessage>(r#"{"code": 3}"#).is_err());
    }

    #[test]
    fn test_delivery_class() {
        assert!(ClientMessage::Update(snapshot(Status::Running, 0)).is_best_effort());
        assert!(!ClientMessage::Start.is_best_effort());
        assert!(!ServerMessage::Pause.is_best_effort());
        assert!(ServerMessage::Update { own: None, other: None }.is_best_effort());
        assert!(!ServerMessage::Update {
            own: Some(snapshot(Status::Waiting, 0)),
            other: None
        }
        .is_best_effort());
    }
}
