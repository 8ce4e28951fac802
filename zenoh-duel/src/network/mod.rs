//! Network layer for zenoh-duel

pub mod keyexpr;
pub mod link;
pub mod liveliness;

pub use keyexpr::{Channel, RoomKeyexpr, server_keyexpr};
pub use link::{LinkPublisher, LinkSubscriber, put_json};
pub use liveliness::{AliveToken, AliveWatch, Presence};
