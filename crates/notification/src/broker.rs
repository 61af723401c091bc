//! Broker abstraction, modelled on AMQP exchanges, queues and bindings.

use async_trait::async_trait;

use crate::{NotificationError, ResultNotification};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExchangeKind {
    /// Route to queues bound with exactly the message routing key.
    Direct,
    /// Route to every bound queue.
    Fanout,
}

impl ExchangeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Fanout => "fanout",
        }
    }
}

impl TryFrom<&str> for ExchangeKind {
    type Error = NotificationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "direct" => Ok(Self::Direct),
            "fanout" => Ok(Self::Fanout),
            other => Err(NotificationError::Decode(format!(
                "unknown exchange kind: {other}"
            ))),
        }
    }
}

/// A message handed out by [`Broker::receive`].
///
/// It stays leased to the receiver until it is acked or rejected; if neither
/// happens before the lease runs out it is delivered again.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Delivery {
    pub tag: String,
    pub exchange: String,
    pub routing_key: String,
    pub payload: String,
    /// Set when the message was handed out before.
    pub redelivered: bool,
}

#[async_trait]
pub trait Broker: Send + Sync {
    /// Idempotent; redeclaring with another kind is an error.
    async fn declare_exchange(&self, name: &str, kind: ExchangeKind) -> ResultNotification<()>;
    /// Idempotent.
    async fn declare_queue(&self, name: &str, durable: bool) -> ResultNotification<()>;
    /// Idempotent.
    async fn bind_queue(
        &self,
        queue: &str,
        exchange: &str,
        routing_key: &str,
    ) -> ResultNotification<()>;
    /// Returns how many queues the message was routed to.
    async fn publish(
        &self,
        exchange: &str,
        routing_key: &str,
        payload: &str,
    ) -> ResultNotification<usize>;
    async fn receive(&self, queue: &str) -> ResultNotification<Option<Delivery>>;
    async fn ack(&self, tag: &str) -> ResultNotification<()>;
    async fn reject(&self, tag: &str, requeue: bool) -> ResultNotification<()>;
}
