//! Rooms by id

use std::collections::HashMap;

use crate::error::Result;
use crate::message::ClientMessage;
use crate::server::room::{Outbound, Room};
use crate::types::{PlayerId, RoomId};

#[derive(Debug, Default)]
pub struct RoomManager {
    rooms: HashMap<RoomId, Room>,
}

impl RoomManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn room(&self, id: &RoomId) -> Option<&Room> {
        self.rooms.get(id)
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Route a client message to its room, creating the room on first contact.
    /// A `leave` for an unknown room is ignored.
    pub fn handle(&mut self, room: &RoomId, player: &PlayerId, message: ClientMessage) -> Result<Outbound> {
        if message == ClientMessage::Leave && !self.rooms.contains_key(room) {
            return Ok(Outbound::new());
        }
        let entry = self.rooms.entry(room.clone()).or_insert_with(|| {
            tracing::info!("Room '{}' created", room);
            Room::new(room.clone())
        });
        let result = entry.handle(player, message);
        self.remove_if_closed(room);
        result
    }

    /// `player` of `room` is no longer alive
    pub fn disconnect(&mut self, room: &RoomId, player: &PlayerId) -> Outbound {
        let Some(entry) = self.rooms.get_mut(room) else {
            return Outbound::new();
        };
        let outbound = entry.disconnect(player);
        self.remove_if_closed(room);
        outbound
    }

    fn remove_if_closed(&mut self, room: &RoomId) {
        if self.rooms.get(room).is_some_and(Room::is_closed) {
            self.rooms.remove(room);
            tracing::info!("Room '{}' destroyed", room);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DuelError;

    fn id(name: &str) -> RoomId {
        RoomId::from_name(name.to_string()).unwrap()
    }

    fn player(name: &str) -> PlayerId {
        PlayerId::from_name(name.to_string()).unwrap()
    }

    #[test]
    fn test_rooms_are_independent() {
        let mut manager = RoomManager::new();
        manager.handle(&id("one"), &player("a"), ClientMessage::Join).unwrap();
        manager.handle(&id("one"), &player("b"), ClientMessage::Join).unwrap();
        manager.handle(&id("two"), &player("c"), ClientMessage::Join).unwrap();
        assert_eq!(manager.len(), 2);
        assert!(matches!(
            manager.handle(&id("one"), &player("c"), ClientMessage::Join),
            Err(DuelError::RoomFull { .. })
        ));
    }

    #[test]
    fn test_room_destroyed_when_empty() {
        let mut manager = RoomManager::new();
        let room = id("one");
        manager.handle(&room, &player("a"), ClientMessage::Join).unwrap();
        manager.handle(&room, &player("b"), ClientMessage::Join).unwrap();

        manager.disconnect(&room, &player("a"));
        assert!(manager.room(&room).is_some());
        manager.handle(&room, &player("b"), ClientMessage::Leave).unwrap();
        assert!(manager.is_empty());
    }

    #[test]
    fn test_leave_does_not_create_room() {
        let mut manager = RoomManager::new();
        manager.handle(&id("ghost"), &player("a"), ClientMessage::Leave).unwrap();
        assert!(manager.is_empty());
        assert!(manager.disconnect(&id("ghost"), &player("a")).is_empty());
    }
}
