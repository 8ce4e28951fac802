//! Client side of the duel protocol

use tetris_core::{GameState, SimContext, codec};
use tokio::time::{Interval, MissedTickBehavior};
use zenoh::qos::CongestionControl;

use crate::config::DuelConfig;
use crate::error::{DuelError, Result};
use crate::message::{ClientMessage, ServerMessage};
use crate::network::{AliveToken, AliveWatch, Channel, LinkPublisher, LinkSubscriber, RoomKeyexpr, server_keyexpr};
use crate::sampler::Sampler;
use crate::types::{PlayerId, RoomId};

/// Reachability of the relay server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportState {
    Connected,
    Disconnected,
}

/// Something the application loop has to react to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    /// Decoded message from the server
    Message(ServerMessage),
    /// The server appeared or went away
    Transport(TransportState),
    /// Time to offer a state sample through [`DuelLink::send_sample`]
    SampleDue,
}

struct Connection {
    control: LinkPublisher<ClientMessage>,
    updates: LinkPublisher<ClientMessage>,
    inbound: LinkSubscriber<ServerMessage>,
    token: AliveToken,
    server_watch: AliveWatch,
    sample_timer: Interval,
}

/// One player's connection to a room
pub struct DuelLink {
    session: zenoh::Session,
    config: DuelConfig,
    room: RoomId,
    player: PlayerId,
    sampler: Sampler,
    connection: Option<Connection>,
}

impl DuelLink {
    pub fn new(session: zenoh::Session, config: DuelConfig, room: RoomId, player: PlayerId) -> Self {
        Self {
            session,
            config,
            room,
            player,
            sampler: Sampler::new(),
            connection: None,
        }
    }

    pub fn room(&self) -> &RoomId {
        &self.room
    }

    pub fn player(&self) -> &PlayerId {
        &self.player
    }

    pub fn is_listening(&self) -> bool {
        self.connection.is_some()
    }

    fn keyexpr(&self, channel: Channel) -> RoomKeyexpr {
        RoomKeyexpr::new(
            &self.config.keyexpr_prefix,
            Some(self.room.clone()),
            channel,
            Some(self.player.clone()),
        )
    }

    /// Open the room channels and join. Does nothing if already listening.
    pub async fn listen(&mut self) -> Result<()> {
        if self.connection.is_some() {
            return Ok(());
        }

        let outbound = self.keyexpr(Channel::ClientToServer);
        let control = LinkPublisher::new(&self.session, &outbound, CongestionControl::Block).await?;
        let updates = LinkPublisher::new(&self.session, &outbound, CongestionControl::Drop).await?;
        let inbound = LinkSubscriber::new(&self.session, &self.keyexpr(Channel::ServerToClient)).await?;
        let token = AliveToken::declare(&self.session, self.keyexpr(Channel::Alive).to_keyexpr()?).await?;
        let server_watch =
            AliveWatch::declare(&self.session, server_keyexpr(&self.config.keyexpr_prefix)?).await?;

        let mut sample_timer = tokio::time::interval(self.config.sample_interval);
        sample_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

        control.put(&ClientMessage::Join).await?;
        self.sampler.reset();
        self.connection = Some(Connection {
            control,
            updates,
            inbound,
            token,
            server_watch,
            sample_timer,
        });
        tracing::info!("Player '{}' joined room '{}'", self.player, self.room);
        Ok(())
    }

    async fn send(&self, message: &ClientMessage) -> Result<()> {
        let connection = self.connection.as_ref().ok_or(DuelError::NotConnected)?;
        let publisher = if message.is_best_effort() {
            &connection.updates
        } else {
            &connection.control
        };
        tracing::debug!("Player '{}' sending message {}", self.player, message.code());
        publisher.put(message).await
    }

    /// Tell the server this player is ready
    pub async fn start(&self) -> Result<()> {
        self.send(&ClientMessage::Start).await
    }

    /// Ask the server to pause both players
    pub async fn pause(&self) -> Result<()> {
        self.send(&ClientMessage::Pause).await
    }

    /// Publish `state` if the sampling policy says so. Returns whether it was sent.
    pub async fn send_sample(&mut self, state: &GameState) -> Result<bool> {
        if self.connection.is_none() || !self.sampler.sample(state.status()) {
            return Ok(false);
        }
        self.send(&ClientMessage::Update(codec::encode(state))).await?;
        Ok(true)
    }

    /// Wait for the next event. Never resolves while not listening.
    ///
    /// Malformed inbound messages are logged and skipped.
    pub async fn next_event(&mut self) -> Result<LinkEvent> {
        let Some(connection) = self.connection.as_mut() else {
            return futures::future::pending().await;
        };
        loop {
            tokio::select! {
                _ = connection.sample_timer.tick() => return Ok(LinkEvent::SampleDue),
                result = connection.inbound.recv() => match result {
                    Ok((_, message)) => return Ok(LinkEvent::Message(message)),
                    Err(e) if e.is_malformed_input() => {
                        tracing::warn!("Player '{}' ignoring malformed message: {}", self.player, e);
                    }
                    Err(e) => return Err(e),
                },
                result = connection.server_watch.next() => {
                    let presence = result?;
                    let state = if presence.alive {
                        TransportState::Connected
                    } else {
                        TransportState::Disconnected
                    };
                    tracing::info!("Player '{}' server transport {:?}", self.player, state);
                    return Ok(LinkEvent::Transport(state));
                }
            }
        }
    }

    /// Leave the room and release every declared resource.
    ///
    /// The timer and subscriptions are gone even if sending `leave` fails;
    /// that failure is reported afterwards.
    pub async fn stop(&mut self) -> Result<()> {
        let Some(connection) = self.connection.take() else {
            return Ok(());
        };
        let leave = connection.control.put(&ClientMessage::Leave).await;

        let Connection {
            control,
            updates,
            inbound,
            token,
            server_watch,
            sample_timer,
        } = connection;
        drop(sample_timer);
        inbound.undeclare().await?;
        server_watch.undeclare().await?;
        token.undeclare().await?;
        control.undeclare().await?;
        updates.undeclare().await?;
        tracing::info!("Player '{}' left room '{}'", self.player, self.room);
        leave
    }
}

/// Apply a server message to the local simulation.
///
/// `start` and `pause` drive the local state machine; an update refreshes
/// the opponent mirror and, after a rejoin, the local board.
pub fn apply_server_message(context: &mut SimContext, message: &ServerMessage) {
    match message {
        ServerMessage::Start => context.player_mut().apply_start(),
        ServerMessage::Pause => context.player_mut().apply_pause(),
        ServerMessage::Update { own, other } => {
            if let Some(snapshot) = own {
                if let Err(e) = context.player_mut().apply_snapshot(snapshot) {
                    tracing::warn!("Ignoring own snapshot: {}", e);
                }
            }
            if let Some(snapshot) = other {
                if let Err(e) = context.apply_opponent_snapshot(snapshot) {
                    tracing::warn!("Ignoring opponent snapshot: {}", e);
                }
            }
        }
    }
}
