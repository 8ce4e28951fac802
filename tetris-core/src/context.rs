//! Explicit simulation context: the local controller, the opponent mirror
//! and the observers that react to every tick

use std::time::Instant;

use crate::codec::{self, Snapshot};
use crate::controller::{Controller, SimConfig, TickEvent};
use crate::error::CodecError;
use crate::state::GameState;

/// What observers see on each tick
pub struct SimView<'a> {
    pub player: &'a GameState,
    pub opponent: &'a GameState,
    /// Events produced by the local controller during this tick
    pub events: &'a [TickEvent],
}

/// Collaborator driven by the simulation loop (renderer, sound, ...)
pub trait Observer {
    /// Called first on each tick, in registration order
    fn update(&mut self, view: &SimView<'_>);

    /// Called after every observer has been updated
    fn draw(&mut self, _view: &SimView<'_>) {}
}

pub struct SimContext {
    player: Controller,
    opponent: GameState,
    observers: Vec<Box<dyn Observer + Send>>,
    active: bool,
}

impl SimContext {
    pub fn new(config: SimConfig) -> Self {
        Self::with_controller(Controller::new(config))
    }

    pub fn with_controller(player: Controller) -> Self {
        let opponent = player.config().new_state();
        SimContext {
            player,
            opponent,
            observers: Vec::new(),
            active: false,
        }
    }

    pub fn start(&mut self) {
        if !self.active {
            tracing::info!("simulation started");
            self.active = true;
        }
    }

    pub fn stop(&mut self) {
        if self.active {
            tracing::info!("simulation stopped");
            self.active = false;
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn register(&mut self, observer: Box<dyn Observer + Send>) {
        self.observers.push(observer);
    }

    /// Advance the local game and notify observers. No-op while stopped.
    pub fn tick(&mut self, now: Instant) -> Vec<TickEvent> {
        if !self.active {
            return Vec::new();
        }
        let events = self.player.tick(now);
        let view = SimView {
            player: self.player.state(),
            opponent: &self.opponent,
            events: &events,
        };
        for observer in self.observers.iter_mut() {
            observer.update(&view);
        }
        for observer in self.observers.iter_mut() {
            observer.draw(&view);
        }
        events
    }

    pub fn player(&self) -> &Controller {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Controller {
        &mut self.player
    }

    /// Read-only mirror of the opponent's board
    pub fn opponent(&self) -> &GameState {
        &self.opponent
    }

    /// The only way the opponent mirror changes
    pub fn apply_opponent_snapshot(&mut self, snapshot: &Snapshot) -> Result<(), CodecError> {
        codec::decode(snapshot, &mut self.opponent)
    }
}
