//! Key expression types for duel traffic

use crate::error::{DuelError, Result};
use crate::types::{PlayerId, RoomId};
use zenoh::key_expr::KeyExpr;

/// Which way a room keyexpr carries data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Client messages to the server
    ClientToServer,
    /// Server messages to one client
    ServerToClient,
    /// Player liveliness tokens
    Alive,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::ClientToServer => "c2s",
            Channel::ServerToClient => "s2c",
            Channel::Alive => "alive",
        }
    }
}

impl std::str::FromStr for Channel {
    type Err = DuelError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "c2s" => Ok(Channel::ClientToServer),
            "s2c" => Ok(Channel::ServerToClient),
            "alive" => Ok(Channel::Alive),
            other => Err(DuelError::InvalidKeyexpr(format!("Unknown channel '{}'", other))),
        }
    }
}

/// Room keyexpr
///
/// Pattern: `<prefix>/<room>/<channel>/<player>`
///
/// `None` for room or player stands for the `*` wildcard, which is how the
/// server listens to every room at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomKeyexpr {
    prefix: String,
    room: Option<RoomId>,
    channel: Channel,
    player: Option<PlayerId>,
}

impl RoomKeyexpr {
    pub fn new(prefix: &str, room: Option<RoomId>, channel: Channel, player: Option<PlayerId>) -> Self {
        Self {
            prefix: prefix.to_string(),
            room,
            channel,
            player,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn room(&self) -> Option<&RoomId> {
        self.room.as_ref()
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn player(&self) -> Option<&PlayerId> {
        self.player.as_ref()
    }

    /// Room and player of a concrete (wildcard-free) keyexpr
    pub fn endpoint(&self) -> Result<(RoomId, PlayerId)> {
        match (&self.room, &self.player) {
            (Some(room), Some(player)) => Ok((room.clone(), player.clone())),
            _ => Err(DuelError::InvalidKeyexpr(format!(
                "Keyexpr '{}' has a wildcard endpoint",
                self
            ))),
        }
    }

    /// Zenoh form of this keyexpr
    pub fn to_keyexpr(&self) -> Result<KeyExpr<'static>> {
        Ok(KeyExpr::try_from(self.to_string())?)
    }
}

impl std::fmt::Display for RoomKeyexpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.prefix,
            self.room.as_ref().map_or("*", |room| room.as_str()),
            self.channel.as_str(),
            self.player.as_ref().map_or("*", |player| player.as_str()),
        )
    }
}

impl TryFrom<&KeyExpr<'_>> for RoomKeyexpr {
    type Error = DuelError;

    fn try_from(keyexpr: &KeyExpr<'_>) -> Result<Self> {
        let parts: Vec<&str> = keyexpr.as_str().split('/').collect();

        // Expected pattern: [...prefix]/<room>/<channel>/<player>
        if parts.len() < 4 {
            return Err(DuelError::InvalidKeyexpr(format!(
                "Invalid room keyexpr pattern: {}",
                keyexpr.as_str()
            )));
        }
        let n = parts.len();
        let channel = parts[n - 2].parse::<Channel>()?;
        let room = match parts[n - 3] {
            "*" => None,
            room => Some(RoomId::from_name(room.to_string())?),
        };
        let player = match parts[n - 1] {
            "*" => None,
            player => Some(PlayerId::from_name(player.to_string())?),
        };
        let prefix = parts[..n - 3].join("/");

        Ok(Self {
            prefix,
            room,
            channel,
            player,
        })
    }
}

/// Server liveliness keyexpr: `<prefix>/server`
pub fn server_keyexpr(prefix: &str) -> Result<KeyExpr<'static>> {
    Ok(KeyExpr::try_from(format!("{}/server", prefix))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room() -> RoomId {
        RoomId::from_name("r00m".to_string()).unwrap()
    }

    fn player() -> PlayerId {
        PlayerId::from_name("Finn_7".to_string()).unwrap()
    }

    #[test]
    fn test_room_keyexpr_roundtrip() {
        let keyexpr = RoomKeyexpr::new("tetris/duel", Some(room()), Channel::ClientToServer, Some(player()));
        let zenoh_keyexpr = keyexpr.to_keyexpr().unwrap();
        assert_eq!(zenoh_keyexpr.as_str(), "tetris/duel/r00m/c2s/Finn_7");

        let parsed = RoomKeyexpr::try_from(&zenoh_keyexpr).unwrap();
        assert_eq!(parsed, keyexpr);
        assert_eq!(parsed.prefix(), "tetris/duel");
        assert_eq!(parsed.endpoint().unwrap(), (room(), player()));
    }

    #[test]
    fn test_wildcards() {
        let keyexpr = RoomKeyexpr::new("tetris/duel", None, Channel::Alive, None);
        assert_eq!(keyexpr.to_string(), "tetris/duel/*/alive/*");
        assert!(keyexpr.endpoint().is_err());

        let parsed = RoomKeyexpr::try_from(&keyexpr.to_keyexpr().unwrap()).unwrap();
        assert_eq!(parsed.room(), None);
        assert_eq!(parsed.player(), None);
        assert_eq!(parsed.channel(), Channel::Alive);
    }

    #[test]
    fn test_invalid_patterns() {
        let unknown_channel = KeyExpr::try_from("tetris/duel/r00m/sideways/Finn_7").unwrap();
        assert!(RoomKeyexpr::try_from(&unknown_channel).is_err());

        let too_short = KeyExpr::try_from("r00m/s2c/Finn_7").unwrap();
        assert!(RoomKeyexpr::try_from(&too_short).is_err());
    }

    #[test]
    fn test_server_keyexpr() {
        assert_eq!(server_keyexpr("tetris/duel").unwrap().as_str(), "tetris/duel/server");
        assert!(server_keyexpr("bad//prefix").is_err());
    }
}
