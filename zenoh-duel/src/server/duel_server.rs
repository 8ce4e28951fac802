/// Zenoh front of the room manager
use zenoh::qos::CongestionControl;

use crate::config::DuelConfig;
use crate::error::Result;
use crate::message::ClientMessage;
use crate::network::{AliveToken, AliveWatch, Channel, LinkSubscriber, Presence, RoomKeyexpr, put_json, server_keyexpr};
use crate::server::manager::RoomManager;
use crate::server::room::Outbound;
use crate::types::RoomId;

/// Commands that can be sent to a running server
#[derive(Debug, Clone)]
pub enum ServerCommand {
    /// Stop the server's run loop
    Stop,
}

/// Serves every room under the configured prefix.
///
/// Listens on `<prefix>/*/c2s/*` for client messages and on
/// `<prefix>/*/alive/*` for player liveliness, answers on
/// `<prefix>/<room>/s2c/<player>` and announces itself with a liveliness
/// token on `<prefix>/server`.
pub struct DuelServer {
    session: zenoh::Session,
    config: DuelConfig,
    manager: RoomManager,
    inbound: LinkSubscriber<ClientMessage>,
    players: AliveWatch,
    token: AliveToken,
    command_tx: flume::Sender<ServerCommand>,
    command_rx: flume::Receiver<ServerCommand>,
}

impl DuelServer {
    pub async fn new(session: zenoh::Session, config: DuelConfig) -> Result<Self> {
        let prefix = config.keyexpr_prefix.clone();
        let inbound =
            LinkSubscriber::new(&session, &RoomKeyexpr::new(&prefix, None, Channel::ClientToServer, None)).await?;
        let players = AliveWatch::declare(
            &session,
            RoomKeyexpr::new(&prefix, None, Channel::Alive, None).to_keyexpr()?,
        )
        .await?;
        let token = AliveToken::declare(&session, server_keyexpr(&prefix)?).await?;
        let (command_tx, command_rx) = flume::unbounded();

        tracing::info!("Duel server listening on '{}'", prefix);
        Ok(Self {
            session,
            config,
            manager: RoomManager::new(),
            inbound,
            players,
            token,
            command_tx,
            command_rx,
        })
    }

    /// Get a sender for sending commands to this server
    pub fn sender(&self) -> flume::Sender<ServerCommand> {
        self.command_tx.clone()
    }

    pub fn rooms(&self) -> &RoomManager {
        &self.manager
    }

    /// Serve until a [`ServerCommand::Stop`] arrives
    pub async fn run(mut self) -> Result<()> {
        loop {
            tokio::select! {
                result = self.inbound.recv() => match result {
                    Ok((keyexpr, message)) => {
                        let (room, player) = match keyexpr.endpoint() {
                            Ok(endpoint) => endpoint,
                            Err(e) => {
                                tracing::warn!("Dropping message: {}", e);
                                continue;
                            }
                        };
                        tracing::debug!("Room '{}': message {} from '{}'", room, message.code(), player);
                        match self.manager.handle(&room, &player, message) {
                            Ok(outbound) => self.deliver(&room, outbound).await,
                            Err(e) => tracing::warn!("Room '{}': {}", room, e),
                        }
                    }
                    Err(e) if e.is_malformed_input() => {
                        tracing::warn!("Ignoring malformed client message: {}", e);
                    }
                    Err(e) => return Err(e),
                },
                result = self.players.next() => {
                    let presence = result?;
                    self.handle_presence(presence).await;
                }
                command = self.command_rx.recv_async() => match command {
                    Ok(ServerCommand::Stop) | Err(_) => {
                        tracing::info!("Duel server stopping");
                        break;
                    }
                },
            }
        }
        self.inbound.undeclare().await?;
        self.players.undeclare().await?;
        self.token.undeclare().await?;
        Ok(())
    }

    async fn handle_presence(&mut self, presence: Presence) {
        let endpoint = RoomKeyexpr::try_from(&presence.key_expr).and_then(|keyexpr| keyexpr.endpoint());
        let (room, player) = match endpoint {
            Ok(endpoint) => endpoint,
            Err(e) => {
                tracing::warn!("Ignoring liveliness of '{}': {}", presence.key_expr, e);
                return;
            }
        };
        if presence.alive {
            tracing::debug!("Room '{}': player '{}' is alive", room, player);
            return;
        }
        let outbound = self.manager.disconnect(&room, &player);
        self.deliver(&room, outbound).await;
    }

    async fn deliver(&self, room: &RoomId, outbound: Outbound) {
        for (player, message) in outbound {
            let keyexpr = RoomKeyexpr::new(
                &self.config.keyexpr_prefix,
                Some(room.clone()),
                Channel::ServerToClient,
                Some(player.clone()),
            );
            let congestion_control = if message.is_best_effort() {
                CongestionControl::Drop
            } else {
                CongestionControl::Block
            };
            let result = match keyexpr.to_keyexpr() {
                Ok(keyexpr) => put_json(&self.session, keyexpr, &message, congestion_control).await,
                Err(e) => Err(e),
            };
            if let Err(e) = result {
                tracing::error!("Room '{}': failed to send to '{}': {}", room, player, e);
            }
        }
    }
}
