//! Out-of-band email notifications.
//!
//! A request that wants an email sent hands an [`EmailEvent`] to a
//! [`Notifier`]. The [`NotificationBridge`] publishes it to a durable
//! [`Broker`] and returns as soon as the publish is committed; the
//! [`EmailConsumer`] pulls it from the queue later and hands it to a
//! [`Mailer`]. Delivery is at-least-once.
//!
//! The broker topology is fixed:
//!
//! | | name |
//! |---|---|
//! | exchange (direct, durable) | [`EXCHANGE`] |
//! | queue (durable) | [`QUEUE`] |
//! | routing key | [`ROUTING_KEY`] |
//!
//!  [`EmailEvent`]: api_types::notification::EmailEvent
pub use amqp_broker::AmqpBroker;
pub use bridge::{NotificationBridge, Notifier, declare_topology};
pub use broker::{Broker, Delivery, ExchangeKind};
pub use consumer::{ConsumerOptions, EmailConsumer, Handled};
pub use error::NotificationError;
pub use mailer::{ConsoleMailer, Mailer, SmtpMailer, SmtpSecurity, SmtpSettings, parse_mailbox};
pub use retry::Backoff;
pub use sql_broker::SqlBroker;

mod amqp_broker;
mod bridge;
mod broker;
mod consumer;
mod error;
mod mailer;
mod retry;
mod sql_broker;

/// Exchange every notification is published to.
pub const EXCHANGE: &str = "notification.exchange";
/// Queue the email consumer reads from.
pub const QUEUE: &str = "email_queue";
/// Routing key binding [`QUEUE`] to [`EXCHANGE`].
pub const ROUTING_KEY: &str = "notification.email";

pub type ResultNotification<T> = Result<T, NotificationError>;
