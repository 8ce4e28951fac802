//! # tetris-core
//!
//! Simulation engine for a two-player falling-block game.
//!
//! ## Overview
//!
//! Each player runs a [`Controller`] over their own [`GameState`]: pieces are
//! drawn from a short random queue, fall under a fixed gravity interval, lock
//! into a fixed-size [`Grid`] and clear completed rows for points. The
//! opponent's board is a read-only mirror updated from [`Snapshot`]s, the
//! compact serializable form produced by [`codec::encode`].
//!
//! Starting and pausing are not decided locally: the controller only moves
//! to `starting` on a request and waits for [`Controller::apply_start`] or
//! [`Controller::apply_pause`] from whoever arbitrates the match.
//!
//! ## Example
//!
//! ```rust
//! use std::time::{Duration, Instant};
//! use tetris_core::{Controller, SimConfig, Status};
//!
//! let mut controller = Controller::with_seed(SimConfig::default(), 7);
//! controller.request_start();
//! controller.apply_start();
//! assert_eq!(controller.state().status(), Status::Running);
//!
//! let t0 = Instant::now();
//! controller.tick(t0);
//! controller.move_left();
//! controller.tick(t0 + Duration::from_millis(500));
//! ```

// Module declarations
pub mod codec;
pub mod context;
pub mod controller;
pub mod error;
pub mod grid;
pub mod scoring;
pub mod shape;
pub mod sprite;
pub mod state;

// Re-exports for convenience
pub use codec::{Snapshot, SpriteDescriptor};
pub use context::{Observer, SimContext, SimView};
pub use controller::{Controller, SimConfig, TickEvent, is_valid_placement};
pub use error::{CodecError, CoreError, Result};
pub use grid::Grid;
pub use scoring::line_clear_score;
pub use shape::{PieceType, Shape};
pub use sprite::{PieceDescriptor, Point, Rect, Sprite};
pub use state::{GameState, NextQueue, Status};
