use sea_orm::DbErr;
use thiserror::Error;

/// Errors of the broker, the bridge, the consumer and the mailers.
#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("Invalid email event: {0}")]
    InvalidEvent(String),
    #[error("Unknown exchange: {0}")]
    UnknownExchange(String),
    #[error("Unknown queue: {0}")]
    UnknownQueue(String),
    #[error("Unknown delivery: {0}")]
    UnknownDelivery(String),
    #[error("Exchange \"{0}\" already declared with another kind")]
    ExchangeMismatch(String),
    #[error("Cannot decode message: {0}")]
    Decode(String),
    #[error("Mail delivery failed: {0}")]
    Mail(String),
    #[error("Notification service unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl From<lapin::Error> for NotificationError {
    fn from(value: lapin::Error) -> Self {
        Self::Unavailable(format!("AMQP broker: {value}"))
    }
}
