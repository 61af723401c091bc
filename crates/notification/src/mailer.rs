//! Mail delivery.

use api_types::notification::EmailEvent;
use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use serde::Deserialize;
use tracing::{debug, info};

use crate::{NotificationError, ResultNotification};

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &EmailEvent) -> ResultNotification<()>;
}

/// Parse a mailbox (`a@example.com` or `Name <a@example.com>`).
pub fn parse_mailbox(value: &str) -> ResultNotification<Mailbox> {
    value
        .trim()
        .parse::<Mailbox>()
        .map_err(|err| NotificationError::InvalidEvent(format!("invalid address {value}: {err}")))
}

/// How the SMTP connection is secured.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmtpSecurity {
    /// TLS from the first byte (usually port 465).
    Tls,
    /// Plain connection upgraded with STARTTLS (usually port 587).
    #[default]
    Starttls,
    /// No encryption; only for local relays.
    None,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SmtpSettings {
    pub server: String,
    pub port: u16,
    #[serde(default)]
    pub security: SmtpSecurity,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub from_email: String,
    #[serde(default)]
    pub from_name: String,
}

/// Sends mail through an SMTP relay.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(settings: &SmtpSettings) -> ResultNotification<Self> {
        let builder = match settings.security {
            SmtpSecurity::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.server)
                .map_err(|err| NotificationError::Mail(format!("SMTP relay error: {err}")))?,
            SmtpSecurity::Starttls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.server)
                    .map_err(|err| NotificationError::Mail(format!("SMTP relay error: {err}")))?
            }
            SmtpSecurity::None => {
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&settings.server)
            }
        };
        let mut builder = builder.port(settings.port);
        if !settings.username.is_empty() {
            builder = builder.credentials(Credentials::new(
                settings.username.clone(),
                settings.password.clone(),
            ));
        }

        let from = if settings.from_name.is_empty() {
            parse_mailbox(&settings.from_email)?
        } else {
            parse_mailbox(&format!("{} <{}>", settings.from_name, settings.from_email))?
        };

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &EmailEvent) -> ResultNotification<()> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(parse_mailbox(&email.to)?)
            .subject(email.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(email.body.clone())
            .map_err(|err| NotificationError::InvalidEvent(format!("cannot build email: {err}")))?;

        self.transport
            .send(message)
            .await
            .map_err(|err| NotificationError::Mail(err.to_string()))?;
        debug!(to = %email.to, "email handed to SMTP relay");
        Ok(())
    }
}

/// Logs mail instead of sending it. Used when no SMTP relay is configured.
#[derive(Clone, Debug, Default)]
pub struct ConsoleMailer;

#[async_trait]
impl Mailer for ConsoleMailer {
    async fn send(&self, email: &EmailEvent) -> ResultNotification<()> {
        info!(to = %email.to, subject = %email.subject, "email (console mailer)");
        debug!(body = %email.body, "email body");
        Ok(())
    }
}
