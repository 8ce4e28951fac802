//! Authoritative state of one duel room

use tetris_core::{Snapshot, Status};

use crate::error::{DuelError, Result};
use crate::message::{ClientMessage, ServerMessage};
use crate::types::{PlayerId, RoomId};

/// Messages to deliver after handling an input, in order
pub type Outbound = Vec<(PlayerId, ServerMessage)>;

/// Maximum number of seats in a room
pub const SEATS: usize = 2;

/// A seat is kept for its player after a disconnect so they can come back
#[derive(Debug, Clone)]
pub struct Seat {
    player: PlayerId,
    status: Option<Status>,
    snapshot: Option<Snapshot>,
    connected: bool,
}

impl Seat {
    fn new(player: PlayerId) -> Self {
        Seat {
            player,
            status: None,
            snapshot: None,
            connected: true,
        }
    }

    pub fn player(&self) -> &PlayerId {
        &self.player
    }

    /// Status as tracked by the server; None until the player reports one
    pub fn status(&self) -> Option<Status> {
        self.status
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    fn is_ended(&self) -> bool {
        self.status == Some(Status::Ended)
    }

    // Running and paused are only ever entered on the server's word, so a
    // report sent before the player heard about them must not undo them
    fn report(&mut self, snapshot: Snapshot) {
        let keep = matches!(self.status, Some(Status::Running | Status::Paused))
            && matches!(snapshot.status, Status::Starting | Status::Running | Status::Paused);
        if !keep {
            self.status = Some(snapshot.status);
        }
        self.snapshot = Some(snapshot);
    }

    fn set_status(&mut self, status: Status) {
        self.status = Some(status);
        if let Some(snapshot) = self.snapshot.as_mut() {
            snapshot.status = status;
        }
    }
}

#[derive(Debug)]
pub struct Room {
    id: RoomId,
    seats: Vec<Seat>,
    closed: bool,
}

impl Room {
    pub fn new(id: RoomId) -> Self {
        Room {
            id,
            seats: Vec::with_capacity(SEATS),
            closed: false,
        }
    }

    pub fn id(&self) -> &RoomId {
        &self.id
    }

    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }

    pub fn seat(&self, player: &PlayerId) -> Option<&Seat> {
        self.seats.iter().find(|seat| &seat.player == player)
    }

    /// Set once the match is over for everybody; the room can be dropped
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn index_of(&self, player: &PlayerId) -> Option<usize> {
        self.seats.iter().position(|seat| &seat.player == player)
    }

    /// Seat of `player`, taking a free one if needed
    fn take_seat(&mut self, player: &PlayerId) -> Result<usize> {
        if let Some(index) = self.index_of(player) {
            self.seats[index].connected = true;
            return Ok(index);
        }
        if self.seats.len() >= SEATS {
            return Err(DuelError::RoomFull {
                room: self.id.to_string(),
                player: player.to_string(),
            });
        }
        tracing::info!("Room '{}': player '{}' takes seat {}", self.id, player, self.seats.len());
        self.seats.push(Seat::new(player.clone()));
        Ok(self.seats.len() - 1)
    }

    fn opponent_index(&self, index: usize) -> Option<usize> {
        (0..self.seats.len()).find(|&other| other != index)
    }

    /// Apply one client message from `player`.
    ///
    /// Any message from an unseated player seats them if a seat is free;
    /// otherwise the message is rejected with [`DuelError::RoomFull`].
    pub fn handle(&mut self, player: &PlayerId, message: ClientMessage) -> Result<Outbound> {
        if message == ClientMessage::Leave {
            return Ok(self.disconnect(player));
        }
        let index = self.take_seat(player)?;
        let opponent = self.opponent_index(index);
        let mut outbound = Outbound::new();

        match message {
            ClientMessage::Join => {
                let own = self.seats[index].snapshot.clone();
                let other = opponent.and_then(|o| self.seats[o].snapshot.clone());
                outbound.push((player.clone(), ServerMessage::Update { own, other }));
            }
            ClientMessage::Update(snapshot) => {
                self.seats[index].report(snapshot.clone());
                if let Some(o) = opponent {
                    outbound.push((
                        self.seats[o].player.clone(),
                        ServerMessage::Update {
                            own: None,
                            other: Some(snapshot),
                        },
                    ));
                }
            }
            ClientMessage::Start => {
                let seat = &mut self.seats[index];
                if matches!(seat.status, None | Some(Status::Waiting | Status::Paused)) {
                    seat.set_status(Status::Starting);
                }
                let both_starting = opponent.is_some()
                    && self
                        .seats
                        .iter()
                        .all(|seat| seat.connected && seat.status == Some(Status::Starting));
                if both_starting {
                    tracing::info!("Room '{}': both players ready, starting", self.id);
                    for seat in self.seats.iter_mut() {
                        seat.set_status(Status::Running);
                        outbound.push((seat.player.clone(), ServerMessage::Start));
                    }
                }
            }
            ClientMessage::Pause => {
                if self.seats[index].status == Some(Status::Running) {
                    tracing::info!("Room '{}': paused by '{}'", self.id, player);
                    for seat in self.seats.iter_mut() {
                        seat.set_status(Status::Paused);
                        outbound.push((seat.player.clone(), ServerMessage::Pause));
                    }
                }
            }
            ClientMessage::Leave => {}
        }
        Ok(outbound)
    }

    /// `player` left or lost liveliness.
    ///
    /// A running player forfeits: their seat ends and the opponent is told.
    /// The room closes once nobody is left to play against.
    pub fn disconnect(&mut self, player: &PlayerId) -> Outbound {
        let mut outbound = Outbound::new();
        let Some(index) = self.index_of(player) else {
            return outbound;
        };
        if !self.seats[index].connected {
            return outbound;
        }
        self.seats[index].connected = false;
        tracing::info!("Room '{}': player '{}' disconnected", self.id, player);

        let opponent = self.opponent_index(index);
        let opponent_gone = match opponent {
            None => true,
            Some(o) => self.seats[o].is_ended() || !self.seats[o].connected,
        };

        let seat = &mut self.seats[index];
        if matches!(seat.status, Some(Status::Running | Status::Ended)) {
            seat.set_status(Status::Ended);
            if let (Some(o), Some(snapshot)) = (opponent, seat.snapshot.clone()) {
                if self.seats[o].connected {
                    outbound.push((
                        self.seats[o].player.clone(),
                        ServerMessage::Update {
                            own: None,
                            other: Some(snapshot),
                        },
                    ));
                }
            }
        }

        if opponent_gone {
            tracing::info!("Room '{}' closed", self.id);
            self.closed = true;
        }
        outbound
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room() -> Room {
        Room::new(RoomId::from_name("arena".to_string()).unwrap())
    }

    fn player(name: &str) -> PlayerId {
        PlayerId::from_name(name.to_string()).unwrap()
    }

    fn snapshot(status: Status, score: u32) -> Snapshot {
        Snapshot {
            status,
            score,
            grid: vec![],
            sprite: None,
        }
    }

    fn running_room() -> (Room, PlayerId, PlayerId) {
        let (a, b) = (player("a"), player("b"));
        let mut room = room();
        room.handle(&a, ClientMessage::Join).unwrap();
        room.handle(&b, ClientMessage::Join).unwrap();
        room.handle(&a, ClientMessage::Start).unwrap();
        room.handle(&b, ClientMessage::Start).unwrap();
        (room, a, b)
    }

    #[test]
    fn test_join_replies_with_both_boards() {
        let mut room = room();
        let (a, b) = (player("a"), player("b"));
        let out = room.handle(&a, ClientMessage::Join).unwrap();
        assert_eq!(out, vec![(a.clone(), ServerMessage::Update { own: None, other: None })]);

        room.handle(&a, ClientMessage::Update(snapshot(Status::Waiting, 0))).unwrap();
        let out = room.handle(&b, ClientMessage::Join).unwrap();
        assert_eq!(
            out,
            vec![(
                b.clone(),
                ServerMessage::Update {
                    own: None,
                    other: Some(snapshot(Status::Waiting, 0))
                }
            )]
        );
    }

    #[test]
    fn test_third_player_rejected() {
        let mut room = room();
        room.handle(&player("a"), ClientMessage::Join).unwrap();
        room.handle(&player("b"), ClientMessage::Join).unwrap();
        let err = room.handle(&player("c"), ClientMessage::Join).unwrap_err();
        assert!(matches!(err, DuelError::RoomFull { .. }));
        assert!(room.handle(&player("c"), ClientMessage::Start).is_err());
        assert_eq!(room.seats().len(), 2);
    }

    #[test]
    fn test_update_relayed_to_opponent() {
        let mut room = room();
        let (a, b) = (player("a"), player("b"));
        // Alone in the room: stored, nothing to relay
        assert!(room.handle(&a, ClientMessage::Update(snapshot(Status::Waiting, 0))).unwrap().is_empty());
        room.handle(&b, ClientMessage::Join).unwrap();

        let out = room.handle(&a, ClientMessage::Update(snapshot(Status::Waiting, 0))).unwrap();
        assert_eq!(
            out,
            vec![(
                b.clone(),
                ServerMessage::Update {
                    own: None,
                    other: Some(snapshot(Status::Waiting, 0))
                }
            )]
        );
        assert_eq!(room.seat(&a).unwrap().snapshot(), Some(&snapshot(Status::Waiting, 0)));
    }

    #[test]
    fn test_start_waits_for_both_players() {
        let mut room = room();
        let (a, b) = (player("a"), player("b"));
        room.handle(&a, ClientMessage::Join).unwrap();
        assert!(room.handle(&a, ClientMessage::Start).unwrap().is_empty());
        assert_eq!(room.seat(&a).unwrap().status(), Some(Status::Starting));

        room.handle(&b, ClientMessage::Join).unwrap();
        let out = room.handle(&b, ClientMessage::Start).unwrap();
        assert_eq!(out, vec![(a.clone(), ServerMessage::Start), (b.clone(), ServerMessage::Start)]);
        assert_eq!(room.seat(&a).unwrap().status(), Some(Status::Running));
        assert_eq!(room.seat(&b).unwrap().status(), Some(Status::Running));

        // Already running: a repeated start does nothing
        assert!(room.handle(&a, ClientMessage::Start).unwrap().is_empty());
    }

    #[test]
    fn test_start_needs_both_players_connected() {
        let mut room = room();
        let (a, b) = (player("a"), player("b"));
        room.handle(&a, ClientMessage::Join).unwrap();
        room.handle(&b, ClientMessage::Join).unwrap();
        room.handle(&a, ClientMessage::Start).unwrap();
        room.disconnect(&a);
        assert!(!room.is_closed());

        assert!(room.handle(&b, ClientMessage::Start).unwrap().is_empty());

        // Back in the room, a's pending start completes the pair
        room.handle(&a, ClientMessage::Join).unwrap();
        let out = room.handle(&a, ClientMessage::Start).unwrap();
        assert_eq!(out, vec![(a, ServerMessage::Start), (b, ServerMessage::Start)]);
    }

    #[test]
    fn test_stale_report_does_not_undo_start() {
        let (mut room, a, _) = running_room();
        room.handle(&a, ClientMessage::Update(snapshot(Status::Starting, 0))).unwrap();
        assert_eq!(room.seat(&a).unwrap().status(), Some(Status::Running));

        room.handle(&a, ClientMessage::Update(snapshot(Status::Ended, 300))).unwrap();
        assert_eq!(room.seat(&a).unwrap().status(), Some(Status::Ended));
    }

    #[test]
    fn test_pause_only_from_running() {
        let mut room = room();
        let (a, b) = (player("a"), player("b"));
        room.handle(&a, ClientMessage::Join).unwrap();
        room.handle(&b, ClientMessage::Join).unwrap();
        assert!(room.handle(&a, ClientMessage::Pause).unwrap().is_empty());

        let (mut room, a, b) = running_room();
        let out = room.handle(&b, ClientMessage::Pause).unwrap();
        assert_eq!(out, vec![(a.clone(), ServerMessage::Pause), (b.clone(), ServerMessage::Pause)]);
        assert_eq!(room.seat(&a).unwrap().status(), Some(Status::Paused));

        // Resuming needs both players again
        assert!(room.handle(&a, ClientMessage::Start).unwrap().is_empty());
        let out = room.handle(&b, ClientMessage::Start).unwrap();
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_rejoin_reclaims_seat() {
        let (mut room, a, b) = running_room();
        room.handle(&a, ClientMessage::Update(snapshot(Status::Running, 100))).unwrap();
        room.handle(&b, ClientMessage::Update(snapshot(Status::Running, 50))).unwrap();
        room.handle(&a, ClientMessage::Pause).unwrap();

        room.disconnect(&a);
        assert!(!room.seat(&a).unwrap().is_connected());
        assert!(!room.is_closed());

        let out = room.handle(&a, ClientMessage::Join).unwrap();
        assert_eq!(
            out,
            vec![(
                a.clone(),
                ServerMessage::Update {
                    own: Some(snapshot(Status::Paused, 100)),
                    other: Some(snapshot(Status::Paused, 50))
                }
            )]
        );
        assert!(room.seat(&a).unwrap().is_connected());
        assert_eq!(room.seats().len(), 2);
    }

    #[test]
    fn test_running_player_leaving_forfeits() {
        let (mut room, a, b) = running_room();
        room.handle(&a, ClientMessage::Update(snapshot(Status::Running, 100))).unwrap();

        let out = room.handle(&a, ClientMessage::Leave).unwrap();
        assert_eq!(room.seat(&a).unwrap().status(), Some(Status::Ended));
        assert_eq!(
            out,
            vec![(
                b.clone(),
                ServerMessage::Update {
                    own: None,
                    other: Some(snapshot(Status::Ended, 100))
                }
            )]
        );
        // The opponent is still playing
        assert!(!room.is_closed());

        room.handle(&b, ClientMessage::Update(snapshot(Status::Ended, 80))).unwrap();
        room.disconnect(&b);
        assert!(room.is_closed());
    }

    #[test]
    fn test_last_player_leaving_closes_room() {
        let mut room = room();
        let a = player("a");
        room.handle(&a, ClientMessage::Join).unwrap();
        assert!(room.handle(&a, ClientMessage::Leave).unwrap().is_empty());
        assert!(room.is_closed());
    }

    #[test]
    fn test_disconnect_is_idempotent() {
        let (mut room, a, _) = running_room();
        room.handle(&a, ClientMessage::Update(snapshot(Status::Running, 0))).unwrap();
        assert_eq!(room.disconnect(&a).len(), 1);
        assert!(room.disconnect(&a).is_empty());
        assert!(room.disconnect(&player("stranger")).is_empty());
    }
}
