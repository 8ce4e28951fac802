use std::collections::VecDeque;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{CodecError, CoreError, Result};
use crate::grid::Grid;
use crate::shape::PieceType;
use crate::sprite::{PieceDescriptor, Sprite};

/// Lifecycle of one player's game.
///
/// Serialized as its wire integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Status {
    Waiting = 0,
    Paused = 1,
    Starting = 2,
    Running = 3,
    Ended = 4,
}

impl Status {
    /// Whether `self -> next` is an edge of the game state machine
    pub fn can_transition_to(self, next: Status) -> bool {
        use Status::*;
        matches!(
            (self, next),
            (Waiting, Starting)
                | (Paused, Starting)
                | (Starting, Running)
                | (Running, Paused)
                | (Paused, Running)
                | (Running, Ended)
                | (Ended, Waiting)
                | (Waiting, Waiting)
        )
    }
}

impl From<Status> for u8 {
    fn from(status: Status) -> u8 {
        status as u8
    }
}

impl TryFrom<u8> for Status {
    type Error = CodecError;

    fn try_from(code: u8) -> std::result::Result<Self, Self::Error> {
        match code {
            0 => Ok(Status::Waiting),
            1 => Ok(Status::Paused),
            2 => Ok(Status::Starting),
            3 => Ok(Status::Running),
            4 => Ok(Status::Ended),
            other => Err(CodecError::UnknownStatus(other)),
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Status::Waiting => "waiting",
            Status::Paused => "paused",
            Status::Starting => "starting",
            Status::Running => "running",
            Status::Ended => "ended",
        };
        f.write_str(name)
    }
}

/// FIFO of upcoming pieces, kept at or above its capacity when drawn from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextQueue {
    items: VecDeque<PieceDescriptor>,
    capacity: usize,
}

impl NextQueue {
    pub fn new(capacity: usize) -> Self {
        NextQueue {
            items: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Top up the queue with random pieces until it holds `capacity` entries
    pub fn fill(&mut self, rng: &mut impl Rng) {
        while self.items.len() < self.capacity {
            self.items.push_back(random_descriptor(rng));
        }
    }

    /// Take the next piece, refilling so the queue never drops below capacity
    pub fn pop(&mut self, rng: &mut impl Rng) -> PieceDescriptor {
        self.fill(rng);
        let next = self
            .items
            .pop_front()
            .unwrap_or_else(|| random_descriptor(rng));
        self.fill(rng);
        next
    }

    pub fn iter(&self) -> impl Iterator<Item = &PieceDescriptor> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

fn random_descriptor(rng: &mut impl Rng) -> PieceDescriptor {
    let piece = PieceType::ALL[rng.random_range(0..PieceType::ALL.len())];
    let rotation = rng.random_range(0..piece.state_count());
    PieceDescriptor::new(piece, rotation)
}

/// Everything a renderer needs to draw one board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pub(crate) score: u32,
    pub(crate) status: Status,
    pub(crate) grid: Grid,
    pub(crate) active: Option<Sprite>,
    pub(crate) queue: NextQueue,
}

impl GameState {
    pub fn new(width: usize, height: usize, queue_capacity: usize) -> Self {
        GameState {
            score: 0,
            status: Status::Waiting,
            grid: Grid::new(width, height),
            active: None,
            queue: NextQueue::new(queue_capacity),
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn active_piece(&self) -> Option<&Sprite> {
        self.active.as_ref()
    }

    pub fn next_pieces(&self) -> &NextQueue {
        &self.queue
    }

    /// Move to `next` if the state machine allows it
    pub fn transition(&mut self, next: Status) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(CoreError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        tracing::debug!("status {} -> {}", self.status, next);
        self.status = next;
        Ok(())
    }

    /// Back to a fresh `waiting` board. Allowed from `waiting` and `ended`.
    pub fn reset(&mut self) -> Result<()> {
        self.transition(Status::Waiting)?;
        self.score = 0;
        self.grid.clear();
        self.active = None;
        self.queue.clear();
        Ok(())
    }
}
