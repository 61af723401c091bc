use std::sync::Arc;

use api_types::notification::EmailEvent;
use async_trait::async_trait;
use tracing::{debug, info};

use crate::{
    Broker, EXCHANGE, ExchangeKind, NotificationError, QUEUE, ROUTING_KEY, ResultNotification,
};

/// Anything that accepts an email for later delivery.
///
/// Success means the email is queued, not that it was delivered.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_email(&self, email: EmailEvent) -> ResultNotification<()>;
}

/// Declare the notification exchange, queue and binding. Safe to call on
/// every start.
pub async fn declare_topology(broker: &dyn Broker) -> ResultNotification<()> {
    broker
        .declare_exchange(EXCHANGE, ExchangeKind::Direct)
        .await?;
    broker.declare_queue(QUEUE, true).await?;
    broker.bind_queue(QUEUE, EXCHANGE, ROUTING_KEY).await?;
    Ok(())
}

/// Producer side: turns a send request into a durable message.
#[derive(Clone)]
pub struct NotificationBridge {
    broker: Arc<dyn Broker>,
}

impl NotificationBridge {
    /// Declare the topology and return a ready bridge.
    pub async fn connect(broker: Arc<dyn Broker>) -> ResultNotification<Self> {
        declare_topology(broker.as_ref()).await?;
        info!(exchange = EXCHANGE, routing_key = ROUTING_KEY, "notification bridge ready");
        Ok(Self { broker })
    }
}

fn require(field: &str, value: &str) -> ResultNotification<()> {
    if value.trim().is_empty() {
        return Err(NotificationError::InvalidEvent(format!(
            "{field} must not be empty"
        )));
    }
    Ok(())
}

#[async_trait]
impl Notifier for NotificationBridge {
    async fn send_email(&self, email: EmailEvent) -> ResultNotification<()> {
        require("to", &email.to)?;
        require("subject", &email.subject)?;

        let payload = serde_json::to_string(&email)
            .map_err(|err| NotificationError::InvalidEvent(err.to_string()))?;
        let routed = self.broker.publish(EXCHANGE, ROUTING_KEY, &payload).await?;
        debug!(to = %email.to, routed, "email event published");
        Ok(())
    }
}
