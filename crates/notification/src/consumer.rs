use std::{sync::Arc, time::Duration};

use api_types::notification::EmailEvent;
use tracing::{debug, error, info, warn};

use crate::{Backoff, Broker, Mailer, QUEUE, ResultNotification, declare_topology};

#[derive(Clone, Copy, Debug)]
pub struct ConsumerOptions {
    /// Sleep between polls of an empty queue.
    pub poll_interval: Duration,
    /// Put a message back on the queue when the mailer fails.
    pub requeue_on_failure: bool,
    /// Pause after consecutive mailer failures, before polling again.
    pub failure_backoff: Backoff,
}

impl Default for ConsumerOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            requeue_on_failure: false,
            failure_backoff: Backoff::default(),
        }
    }
}

/// What happened to one received message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Handled {
    Sent,
    /// Undecodable payload, dropped.
    Discarded,
    Failed { requeued: bool },
}

/// Subscriber side: pulls email events off the queue and mails them.
pub struct EmailConsumer {
    broker: Arc<dyn Broker>,
    mailer: Arc<dyn Mailer>,
    options: ConsumerOptions,
}

impl EmailConsumer {
    pub fn new(broker: Arc<dyn Broker>, mailer: Arc<dyn Mailer>, options: ConsumerOptions) -> Self {
        Self {
            broker,
            mailer,
            options,
        }
    }

    /// Handle at most one message; `None` when the queue is empty.
    pub async fn run_once(&self) -> ResultNotification<Option<Handled>> {
        let Some(delivery) = self.broker.receive(QUEUE).await? else {
            return Ok(None);
        };

        let email: EmailEvent = match serde_json::from_str(&delivery.payload) {
            Ok(email) => email,
            Err(err) => {
                warn!(tag = %delivery.tag, error = %err, "dropping undecodable email event");
                self.broker.reject(&delivery.tag, false).await?;
                return Ok(Some(Handled::Discarded));
            }
        };

        match self.mailer.send(&email).await {
            Ok(()) => {
                self.broker.ack(&delivery.tag).await?;
                info!(to = %email.to, redelivered = delivery.redelivered, "email sent");
                Ok(Some(Handled::Sent))
            }
            Err(err) => {
                let requeued = self.options.requeue_on_failure;
                error!(to = %email.to, error = %err, requeued, "email delivery failed");
                self.broker.reject(&delivery.tag, requeued).await?;
                Ok(Some(Handled::Failed { requeued }))
            }
        }
    }

    /// Declare the topology, then consume for as long as the process lives.
    pub async fn run(self) -> ResultNotification<()> {
        declare_topology(self.broker.as_ref()).await?;
        info!(queue = QUEUE, "email consumer started");
        let mut failures: u32 = 0;
        loop {
            match self.run_once().await {
                Ok(Some(Handled::Failed { .. })) => {
                    let delay = self.options.failure_backoff.delay_for_attempt(failures);
                    failures = failures.saturating_add(1);
                    debug!(?delay, failures, "backing off after failed delivery");
                    tokio::time::sleep(delay).await;
                }
                Ok(Some(_)) => failures = 0,
                Ok(None) => tokio::time::sleep(self.options.poll_interval).await,
                Err(err) => {
                    error!(error = %err, "email consumer poll failed");
                    tokio::time::sleep(self.options.poll_interval).await;
                }
            }
        }
    }
}
