/// Error types for the tetris-core library
use thiserror::Error;

use crate::state::Status;

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised by local game operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// The requested status change is not an edge of the game state machine
    #[error("Invalid state transition: from {from} to {to}")]
    InvalidTransition {
        /// Current status
        from: Status,
        /// Requested status
        to: Status,
    },
}

/// Errors raised while decoding a wire snapshot
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Status integer outside the known range
    #[error("Unknown status code: {0}")]
    UnknownStatus(u8),

    /// Piece type index outside the catalog
    #[error("Unknown piece type: {0}")]
    UnknownPieceType(u32),

    /// Packed grid does not match the receiving grid's dimensions
    #[error("Grid size mismatch: expected {expected} words, got {actual}")]
    GridSizeMismatch {
        /// Words required by the receiving grid
        expected: usize,
        /// Words carried by the snapshot
        actual: usize,
    },

    /// Active piece does not fit inside the receiving grid
    #[error("Sprite at ({x}, {y}) is outside a {width}x{height} grid")]
    SpriteOutOfBounds {
        x: i32,
        y: i32,
        width: usize,
        height: usize,
    },
}
