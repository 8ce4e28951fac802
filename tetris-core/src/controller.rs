//! Time-driven simulation of one player's board

use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::codec::{self, Snapshot};
use crate::error::{CodecError, Result};
use crate::grid::Grid;
use crate::scoring::line_clear_score;
use crate::sprite::Sprite;
use crate::state::{GameState, Status};

/// Simulation parameters
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Grid width in cells
    pub width: usize,

    /// Grid height in cells
    pub height: usize,

    /// Delay between two gravity steps
    pub fall_interval: Duration,

    /// Minimum number of pieces kept in the next-piece queue
    pub queue_capacity: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            width: 8,
            height: 16,
            fall_interval: Duration::from_millis(500),
            queue_capacity: 3,
        }
    }
}

impl SimConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the grid dimensions
    pub fn with_size(mut self, width: usize, height: usize) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the gravity interval
    pub fn with_fall_interval(mut self, interval: Duration) -> Self {
        self.fall_interval = interval;
        self
    }

    /// Set the next-piece queue capacity (at least 1)
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }

    /// Fresh game state sized for this configuration
    pub fn new_state(&self) -> GameState {
        GameState::new(self.width, self.height, self.queue_capacity)
    }
}

/// Something that happened during a tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickEvent {
    /// A new piece entered above the grid
    Spawned(Sprite),
    /// Gravity moved the active piece down one row
    Fell(Sprite),
    /// The active piece was written into the grid
    Locked {
        /// Rows cleared by the lock, bottom first
        rows: Vec<usize>,
        /// Points earned by the clear
        points: u32,
    },
    /// A piece locked while sticking out above the grid
    GameOver,
}

/// A placement is valid when the shape's bounds stay inside the grid
/// horizontally and at the bottom, and none of its cells inside the grid
/// overlaps an occupied cell. Cells above the grid are never checked.
pub fn is_valid_placement(grid: &Grid, sprite: &Sprite) -> bool {
    let rect = sprite.bounding_box();
    if rect.x < 0 || rect.x + rect.width > grid.width() as i32 || rect.y + rect.height > grid.height() as i32 {
        return false;
    }
    sprite
        .occupied_cells()
        .all(|cell| cell.y < 0 || !grid.cell(cell.x as usize, cell.y as usize))
}

/// Owns and advances the local player's [`GameState`]
#[derive(Debug)]
pub struct Controller {
    config: SimConfig,
    state: GameState,
    rng: StdRng,
    // Time of the last gravity step; None until the first running tick
    last_gravity: Option<Instant>,
}

impl Controller {
    pub fn new(config: SimConfig) -> Self {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    /// Controller with a deterministic piece sequence
    pub fn with_seed(config: SimConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: SimConfig, mut rng: StdRng) -> Self {
        let mut state = config.new_state();
        state.queue.fill(&mut rng);
        Controller {
            config,
            state,
            rng,
            last_gravity: None,
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Advance the simulation to `now`.
    ///
    /// Does nothing unless the game is running. Spawns a piece when none is
    /// active, then applies gravity once the fall interval has elapsed.
    pub fn tick(&mut self, now: Instant) -> Vec<TickEvent> {
        let mut events = Vec::new();
        if self.state.status != Status::Running {
            self.last_gravity = None;
            return events;
        }

        if self.state.active.is_none() {
            self.spawn(&mut events);
        }

        let last = *self.last_gravity.get_or_insert(now);
        if now.saturating_duration_since(last) >= self.config.fall_interval {
            self.last_gravity = Some(now);
            self.gravity_step(&mut events);
        }
        events
    }

    fn spawn(&mut self, events: &mut Vec<TickEvent>) {
        let descriptor = self.state.queue.pop(&mut self.rng);
        let sprite = Sprite::spawn(descriptor, self.config.width);
        self.state.active = Some(sprite);
        events.push(TickEvent::Spawned(sprite));
    }

    fn gravity_step(&mut self, events: &mut Vec<TickEvent>) {
        let Some(current) = self.state.active else {
            return;
        };
        let moved = current.moved(0, 1);
        if is_valid_placement(&self.state.grid, &moved) {
            self.state.active = Some(moved);
            events.push(TickEvent::Fell(moved));
        } else {
            self.lock(current, events);
        }
    }

    // Write the piece into the grid, clear and score completed rows, then
    // either end the game or bring in the next piece
    fn lock(&mut self, sprite: Sprite, events: &mut Vec<TickEvent>) {
        self.state.active = None;
        for cell in sprite.occupied_cells() {
            if cell.y >= 0 {
                self.state.grid.set(cell.x as usize, cell.y as usize);
            }
        }

        let rect = sprite.bounding_box();
        let rows = self.state.grid.find_complete_rows(rect.y, rect.bottom_row());
        let mut points = 0;
        if !rows.is_empty() {
            self.state.grid.clear_rows(&rows);
            points = line_clear_score(&rows);
            self.state.score += points;
            tracing::debug!("cleared rows {:?} for {} points", rows, points);
        }
        events.push(TickEvent::Locked { rows, points });

        if rect.y < 0 {
            if let Err(e) = self.state.transition(Status::Ended) {
                tracing::error!("failed to end game: {}", e);
            }
            tracing::info!("game over with score {}", self.state.score);
            events.push(TickEvent::GameOver);
        } else {
            self.spawn(events);
        }
    }

    // Replace the active piece with `change(active)` if the result is a valid placement
    fn try_change(&mut self, change: impl FnOnce(&Sprite) -> Sprite) -> bool {
        if self.state.status != Status::Running {
            return false;
        }
        let Some(current) = &self.state.active else {
            return false;
        };
        let candidate = change(current);
        if !is_valid_placement(&self.state.grid, &candidate) {
            return false;
        }
        self.state.active = Some(candidate);
        true
    }

    /// Move the active piece one column left, if possible
    pub fn move_left(&mut self) -> bool {
        self.try_change(|sprite| sprite.moved(-1, 0))
    }

    /// Move the active piece one column right, if possible
    pub fn move_right(&mut self) -> bool {
        self.try_change(|sprite| sprite.moved(1, 0))
    }

    /// Move the active piece one row down on demand, if possible.
    /// Unlike gravity, a blocked soft drop does not lock the piece.
    pub fn soft_drop(&mut self) -> bool {
        self.try_change(|sprite| sprite.moved(0, 1))
    }

    /// Rotate the active piece, if the rotated shape fits where it is
    pub fn rotate(&mut self) -> bool {
        self.try_change(Sprite::rotate)
    }

    /// Player asks to start or resume.
    ///
    /// Flips to `starting` for immediate feedback; `running` is only entered
    /// when the server confirms with [`Controller::apply_start`]. Returns
    /// whether a start request should be sent.
    pub fn request_start(&mut self) -> bool {
        match self.state.status {
            Status::Waiting | Status::Paused => self.state.transition(Status::Starting).is_ok(),
            Status::Starting => true,
            Status::Running | Status::Ended => false,
        }
    }

    /// Player asks to pause. Returns whether a pause request should be sent.
    pub fn request_pause(&self) -> bool {
        self.state.status == Status::Running
    }

    /// Server confirmed the start of the game
    pub fn apply_start(&mut self) {
        if matches!(self.state.status, Status::Waiting | Status::Paused) {
            if let Err(e) = self.state.transition(Status::Starting) {
                tracing::debug!("ignoring start: {}", e);
                return;
            }
        }
        match self.state.transition(Status::Running) {
            Ok(()) => self.last_gravity = None,
            Err(e) => tracing::debug!("ignoring start: {}", e),
        }
    }

    /// Server paused the game
    pub fn apply_pause(&mut self) {
        if let Err(e) = self.state.transition(Status::Paused) {
            tracing::debug!("ignoring pause: {}", e);
        }
    }

    /// Start over with an empty board
    pub fn reset(&mut self) -> Result<()> {
        self.state.reset()?;
        self.state.queue.fill(&mut self.rng);
        self.last_gravity = None;
        Ok(())
    }

    /// Overwrite the local state with a snapshot sent back by the server
    pub fn apply_snapshot(&mut self, snapshot: &Snapshot) -> std::result::Result<(), CodecError> {
        codec::decode(snapshot, &mut self.state)
    }

    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }
}
