//! Relay server: owns the rooms and arbitrates start and pause

pub mod duel_server;
pub mod manager;
pub mod room;

pub use duel_server::{DuelServer, ServerCommand};
pub use manager::RoomManager;
pub use room::{Outbound, Room, Seat};
