//! # zenoh-duel
//!
//! Two-player match synchronization over Zenoh.
//!
//! ## Overview
//!
//! Each player simulates their own board locally with `tetris-core` and
//! publishes periodic snapshots to a relay [`DuelServer`]. The server keeps
//! the rooms, relays every snapshot to the opponent and is the only one that
//! decides when a match starts or pauses. Clients talk to it through a
//! [`DuelLink`].
//!
//! Traffic is addressed by key expressions with the room id in the path:
//!
//! - `<prefix>/<room>/c2s/<player>`: client to server
//! - `<prefix>/<room>/s2c/<player>`: server to client
//! - `<prefix>/<room>/alive/<player>`: player liveliness
//! - `<prefix>/server`: server liveliness
//!
//! ## Example
//!
//! ```rust,no_run
//! use zenoh_duel::{DuelConfig, DuelLink, LinkEvent, PlayerId, RoomId};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let config = DuelConfig::default();
//!     let session = zenoh::open(config.zenoh_config.clone()).await?;
//!
//!     let mut link = DuelLink::new(session, config, RoomId::generate(), PlayerId::generate());
//!     link.listen().await?;
//!     if let LinkEvent::Message(message) = link.next_event().await? {
//!         println!("{:?}", message);
//!     }
//!     link.stop().await?;
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod client;
pub mod config;
pub mod error;
pub mod message;
pub mod name_generator;
pub mod network;
pub mod sampler;
pub mod server;
pub mod types;

// Re-exports for convenience
pub use client::{DuelLink, LinkEvent, TransportState, apply_server_message};
pub use config::DuelConfig;
pub use error::{DuelError, Result};
pub use message::{ClientMessage, ServerMessage};
pub use sampler::Sampler;
pub use server::{DuelServer, Room, RoomManager, ServerCommand};
pub use types::{PlayerId, RoomId};
