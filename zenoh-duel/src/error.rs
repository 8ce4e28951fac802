/// Error types for the zenoh-duel library
use thiserror::Error;

/// Result type alias for duel operations
pub type Result<T> = std::result::Result<T, DuelError>;

/// Errors that can occur in zenoh-duel operations
#[derive(Debug, Error)]
pub enum DuelError {
    /// Zenoh-related errors
    #[error("Zenoh error: {0}")]
    Zenoh(#[from] zenoh::Error),

    /// Invalid room id provided
    #[error("Invalid room id: {0}. Must be a valid single-chunk keyexpr (no /, *, $, ?, #, @)")]
    InvalidRoom(String),

    /// Invalid player id provided
    #[error("Invalid player id: {0}. Must be a valid single-chunk keyexpr (no /, *, $, ?, #, @)")]
    InvalidPlayerId(String),

    /// Invalid keyexpr pattern
    #[error("Invalid keyexpr: {0}")]
    InvalidKeyexpr(String),

    /// Message could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Both seats of the room are taken by other players
    #[error("Room {room} is full, rejecting {player}")]
    RoomFull {
        /// Room that was asked for
        room: String,
        /// Player that was turned away
        player: String,
    },

    /// Operation requires a listening link
    #[error("Not connected")]
    NotConnected,

    /// The underlying channel was closed
    #[error("Channel closed: {0}")]
    ChannelClosed(String),
}

impl DuelError {
    /// Whether the error only concerns one inbound sample, which can be
    /// skipped without tearing down the receiver
    pub fn is_malformed_input(&self) -> bool {
        matches!(
            self,
            DuelError::Serialization(_)
                | DuelError::InvalidKeyexpr(_)
                | DuelError::InvalidRoom(_)
                | DuelError::InvalidPlayerId(_)
        )
    }
}

impl From<serde_json::Error> for DuelError {
    fn from(e: serde_json::Error) -> Self {
        DuelError::Serialization(e.to_string())
    }
}

impl From<tetris_core::CodecError> for DuelError {
    fn from(e: tetris_core::CodecError) -> Self {
        DuelError::Serialization(e.to_string())
    }
}
