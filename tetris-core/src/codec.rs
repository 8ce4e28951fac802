//! Conversion between [`GameState`] and its compact wire snapshot

use serde::{Deserialize, Serialize};

use crate::error::CodecError;
use crate::shape::PieceType;
use crate::sprite::{Point, Sprite};
use crate::state::{GameState, Status};

/// Wire form of the active piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteDescriptor {
    /// Piece type index
    #[serde(rename = "type")]
    pub piece: u32,
    /// Rotation index
    pub state: u32,
    /// Grid position as [x, y]
    pub pos: [i32; 2],
}

impl From<&Sprite> for SpriteDescriptor {
    fn from(sprite: &Sprite) -> Self {
        let position = sprite.position();
        SpriteDescriptor {
            piece: sprite.piece().index() as u32,
            state: sprite.rotation() as u32,
            pos: [position.x, position.y],
        }
    }
}

impl TryFrom<&SpriteDescriptor> for Sprite {
    type Error = CodecError;

    fn try_from(descriptor: &SpriteDescriptor) -> Result<Self, Self::Error> {
        let piece = PieceType::from_index(descriptor.piece as usize)
            .ok_or(CodecError::UnknownPieceType(descriptor.piece))?;
        Ok(Sprite::new(
            piece,
            descriptor.state as usize,
            Point::new(descriptor.pos[0], descriptor.pos[1]),
        ))
    }
}

/// Serialized form of one side's game state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub status: Status,
    pub score: u32,
    /// Grid packed by [`crate::Grid::to_bitset`]
    #[serde(default)]
    pub grid: Vec<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sprite: Option<SpriteDescriptor>,
}

/// Snapshot of `state`, with the active piece iff one exists
pub fn encode(state: &GameState) -> Snapshot {
    Snapshot {
        status: state.status,
        score: state.score,
        grid: state.grid.to_bitset(),
        sprite: state.active.as_ref().map(SpriteDescriptor::from),
    }
}

/// Overwrite `state` with `snapshot`.
///
/// The snapshot is validated before anything is written, so a malformed
/// snapshot leaves `state` untouched. Status and score are always replaced,
/// the active piece is replaced (or cleared when the snapshot carries none)
/// and the grid is reloaded from its packed words.
pub fn decode(snapshot: &Snapshot, state: &mut GameState) -> Result<(), CodecError> {
    let expected = state.grid.word_count();
    if !snapshot.grid.is_empty() && snapshot.grid.len() != expected {
        return Err(CodecError::GridSizeMismatch {
            expected,
            actual: snapshot.grid.len(),
        });
    }
    let active = snapshot.sprite.as_ref().map(Sprite::try_from).transpose()?;
    if let Some(sprite) = &active {
        check_bounds(sprite, state.grid.width(), state.grid.height())?;
    }

    state.status = snapshot.status;
    state.score = snapshot.score;
    state.active = active;
    state.grid.from_bitset(&snapshot.grid);
    Ok(())
}

/// The piece's box must lie within the grid columns and above the floor.
/// Rows above the top are allowed, pieces spawn there.
fn check_bounds(sprite: &Sprite, width: usize, height: usize) -> Result<(), CodecError> {
    let bounds = sprite.bounding_box();
    let (x, y) = (i64::from(bounds.x), i64::from(bounds.y));
    let fits = x >= 0
        && x + i64::from(bounds.width) <= width as i64
        && y + i64::from(bounds.height) <= height as i64;
    if fits {
        Ok(())
    } else {
        Err(CodecError::SpriteOutOfBounds {
            x: bounds.x,
            y: bounds.y,
            width,
            height,
        })
    }
}
