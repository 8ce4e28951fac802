//! Liveliness tokens and watches

use zenoh::key_expr::KeyExpr;
use zenoh::liveliness::LivelinessToken;
use zenoh::sample::SampleKind;

use crate::error::{DuelError, Result};

/// Wrapper around Zenoh's LivelinessToken
///
/// The token is withdrawn when dropped or undeclared.
#[derive(Debug)]
pub struct AliveToken {
    token: LivelinessToken,
}

impl AliveToken {
    pub async fn declare(session: &zenoh::Session, keyexpr: KeyExpr<'static>) -> Result<Self> {
        let token = session.liveliness().declare_token(keyexpr).await?;
        Ok(Self { token })
    }

    pub async fn undeclare(self) -> Result<()> {
        self.token.undeclare().await?;
        Ok(())
    }
}

/// A token matching the watched keyexpr appeared or disappeared
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presence {
    pub key_expr: KeyExpr<'static>,
    pub alive: bool,
}

/// Follows liveliness tokens matching a keyexpr (wildcards allowed).
///
/// Tokens already alive when the watch is declared are reported first.
pub struct AliveWatch {
    subscriber: zenoh::pubsub::Subscriber<zenoh::handlers::FifoChannelHandler<zenoh::sample::Sample>>,
}

impl std::fmt::Debug for AliveWatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AliveWatch")
            .field("key_expr", &self.subscriber.key_expr())
            .finish()
    }
}

impl AliveWatch {
    pub async fn declare(session: &zenoh::Session, keyexpr: KeyExpr<'static>) -> Result<Self> {
        let subscriber = session
            .liveliness()
            .declare_subscriber(keyexpr)
            .history(true)
            .await?;
        Ok(Self { subscriber })
    }

    pub async fn next(&self) -> Result<Presence> {
        let sample = self
            .subscriber
            .recv_async()
            .await
            .map_err(|e| DuelError::ChannelClosed(e.to_string()))?;
        Ok(Presence {
            key_expr: sample.key_expr().clone(),
            alive: sample.kind() == SampleKind::Put,
        })
    }

    pub async fn undeclare(self) -> Result<()> {
        self.subscriber.undeclare().await?;
        Ok(())
    }
}
