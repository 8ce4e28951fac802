/// Identifier types for the zenoh-duel library
use crate::error::{DuelError, Result};
use crate::name_generator::generate_unique_name;

/// Check that `s` can be used as a single keyexpr chunk
fn is_single_chunk(s: &str) -> std::result::Result<(), String> {
    if s.is_empty() {
        return Err("cannot be empty".to_string());
    }
    // Invalid characters: / * $ ? # @
    match s.chars().find(|ch| matches!(ch, '/' | '*' | '$' | '?' | '#' | '@')) {
        Some(ch) => Err(format!("'{}' contains invalid character '{}'", s, ch)),
        None => Ok(()),
    }
}

/// Stable identity of a player across reconnections
///
/// PlayerId must be a valid single-chunk keyexpr:
/// - Non-empty UTF-8 string
/// - Cannot contain: / * $ ? # @
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlayerId(String);

impl PlayerId {
    /// Generate a readable random player id, e.g. "Theron_42"
    pub fn generate() -> Self {
        PlayerId(generate_unique_name())
    }

    /// Create from a specific name
    /// Returns error if name contains invalid characters
    pub fn from_name(name: String) -> Result<Self> {
        is_single_chunk(&name).map_err(DuelError::InvalidPlayerId)?;
        Ok(PlayerId(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Address of a match; both players of a duel use the same room id
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomId(String);

impl RoomId {
    /// Generate a new unique room id (guaranteed to be keyexpr-safe)
    /// Uses base58 encoding of UUID to avoid special characters
    pub fn generate() -> Self {
        let uuid = uuid::Uuid::new_v4();
        let encoded = bs58::encode(uuid.as_bytes()).into_string();
        // Short enough to be typed by the second player
        RoomId(encoded.chars().take(12).collect())
    }

    /// Parse a room id given by a user or found in a keyexpr
    pub fn from_name(name: String) -> Result<Self> {
        is_single_chunk(&name).map_err(DuelError::InvalidRoom)?;
        Ok(RoomId(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RoomId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for RoomId {
    type Err = DuelError;

    fn from_str(s: &str) -> Result<Self> {
        RoomId::from_name(s.to_string())
    }
}

impl std::str::FromStr for PlayerId {
    type Err = DuelError;

    fn from_str(s: &str) -> Result<Self> {
        PlayerId::from_name(s.to_string())
    }
}
