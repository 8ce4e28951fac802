//! JSON publisher and subscriber for room channels

use serde::Serialize;
use serde::de::DeserializeOwned;
use zenoh::key_expr::KeyExpr;
use zenoh::qos::CongestionControl;

use crate::error::{DuelError, Result};
use crate::network::keyexpr::RoomKeyexpr;

/// Publishes values of type T as JSON on one keyexpr
pub struct LinkPublisher<T> {
    publisher: zenoh::pubsub::Publisher<'static>,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> std::fmt::Debug for LinkPublisher<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkPublisher")
            .field("type", &std::any::type_name::<T>())
            .field("key_expr", &self.publisher.key_expr())
            .finish()
    }
}

impl<T> LinkPublisher<T>
where
    T: Serialize,
{
    /// Declare a publisher on `keyexpr`.
    ///
    /// With [`CongestionControl::Drop`] samples are discarded when the
    /// network cannot keep up; with [`CongestionControl::Block`] `put` waits.
    pub async fn new(
        session: &zenoh::Session,
        keyexpr: &RoomKeyexpr,
        congestion_control: CongestionControl,
    ) -> Result<Self> {
        let publisher = session
            .declare_publisher(keyexpr.to_keyexpr()?)
            .congestion_control(congestion_control)
            .await?;

        Ok(Self {
            publisher,
            _phantom: std::marker::PhantomData,
        })
    }

    pub async fn put(&self, value: &T) -> Result<()> {
        let payload = serde_json::to_vec(value)?;
        self.publisher.put(payload).await?;
        Ok(())
    }

    pub async fn undeclare(self) -> Result<()> {
        self.publisher.undeclare().await?;
        Ok(())
    }
}

/// One-shot JSON put, for senders that address many keyexprs
pub async fn put_json<T: Serialize>(
    session: &zenoh::Session,
    keyexpr: KeyExpr<'static>,
    value: &T,
    congestion_control: CongestionControl,
) -> Result<()> {
    let payload = serde_json::to_vec(value)?;
    session
        .put(keyexpr, payload)
        .congestion_control(congestion_control)
        .await?;
    Ok(())
}

/// Subscribes to a room keyexpr (usually with wildcards) and decodes JSON
pub struct LinkSubscriber<T> {
    subscriber: zenoh::pubsub::Subscriber<zenoh::handlers::FifoChannelHandler<zenoh::sample::Sample>>,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> std::fmt::Debug for LinkSubscriber<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkSubscriber")
            .field("type", &std::any::type_name::<T>())
            .field("key_expr", &self.subscriber.key_expr())
            .finish()
    }
}

impl<T> LinkSubscriber<T>
where
    T: DeserializeOwned,
{
    pub async fn new(session: &zenoh::Session, keyexpr: &RoomKeyexpr) -> Result<Self> {
        let subscriber = session.declare_subscriber(keyexpr.to_keyexpr()?).await?;

        Ok(Self {
            subscriber,
            _phantom: std::marker::PhantomData,
        })
    }

    /// Receive and decode the next value, with the keyexpr it arrived on.
    ///
    /// A malformed sample yields an error for which
    /// [`DuelError::is_malformed_input`] holds; the subscriber stays usable.
    /// [`DuelError::ChannelClosed`] means no more samples will arrive.
    pub async fn recv(&self) -> Result<(RoomKeyexpr, T)> {
        let sample = self
            .subscriber
            .recv_async()
            .await
            .map_err(|e| DuelError::ChannelClosed(e.to_string()))?;

        let keyexpr = RoomKeyexpr::try_from(sample.key_expr())?;
        let value = serde_json::from_slice(&sample.payload().to_bytes())?;
        Ok((keyexpr, value))
    }

    pub async fn undeclare(self) -> Result<()> {
        self.subscriber.undeclare().await?;
        Ok(())
    }
}
