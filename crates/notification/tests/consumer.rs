use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use sea_orm::Database;

use api_types::notification::EmailEvent;
use migration::{BrokerMigrator, MigratorTrait};
use notification::{
    Backoff, Broker, ConsumerOptions, EXCHANGE, EmailConsumer, Handled, Mailer, NotificationBridge,
    NotificationError, Notifier, QUEUE, ROUTING_KEY, SqlBroker, declare_topology,
};

#[derive(Default)]
struct RecordingMailer {
    sent: Mutex<Vec<EmailEvent>>,
    attempts: AtomicUsize,
    fail: bool,
    /// Fail only for this recipient.
    reject_to: Option<String>,
}

impl RecordingMailer {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn rejecting(to: &str) -> Self {
        Self {
            reject_to: Some(to.to_string()),
            ..Self::default()
        }
    }

    fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    fn sent(&self) -> Vec<EmailEvent> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &EmailEvent) -> Result<(), NotificationError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail || self.reject_to.as_deref() == Some(email.to.as_str()) {
            return Err(NotificationError::Mail("relay refused".to_string()));
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

async fn broker_with_db() -> Arc<SqlBroker> {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    BrokerMigrator::up(&db, None).await.unwrap();
    let broker = SqlBroker::new(db);
    declare_topology(&broker).await.unwrap();
    Arc::new(broker)
}

fn welcome() -> EmailEvent {
    email_to("a@example.com")
}

fn email_to(to: &str) -> EmailEvent {
    EmailEvent {
        to: to.to_string(),
        subject: "Welcome".to_string(),
        body: "Hi".to_string(),
    }
}

async fn publish(broker: &SqlBroker, email: &EmailEvent) {
    broker
        .publish(EXCHANGE, ROUTING_KEY, &serde_json::to_string(email).unwrap())
        .await
        .unwrap();
}

#[tokio::test]
async fn empty_queue_yields_nothing() {
    let broker = broker_with_db().await;
    let mailer = Arc::new(RecordingMailer::default());
    let consumer = EmailConsumer::new(broker, mailer, ConsumerOptions::default());

    assert_eq!(consumer.run_once().await.unwrap(), None);
}

#[tokio::test]
async fn published_email_is_sent_and_acked() {
    let broker = broker_with_db().await;
    let bridge = NotificationBridge::connect(broker.clone()).await.unwrap();
    let mailer = Arc::new(RecordingMailer::default());
    let consumer = EmailConsumer::new(broker.clone(), mailer.clone(), ConsumerOptions::default());

    bridge.send_email(welcome()).await.unwrap();

    assert_eq!(consumer.run_once().await.unwrap(), Some(Handled::Sent));
    assert_eq!(mailer.sent(), vec![welcome()]);
    assert!(broker.receive(QUEUE).await.unwrap().is_none());
}

#[tokio::test]
async fn undecodable_payload_is_dropped() {
    let broker = broker_with_db().await;
    let mailer = Arc::new(RecordingMailer::default());
    let consumer = EmailConsumer::new(broker.clone(), mailer.clone(), ConsumerOptions::default());

    broker
        .publish(EXCHANGE, ROUTING_KEY, "{not json")
        .await
        .unwrap();

    assert_eq!(consumer.run_once().await.unwrap(), Some(Handled::Discarded));
    assert!(mailer.sent().is_empty());
    assert_eq!(consumer.run_once().await.unwrap(), None);
}

#[tokio::test]
async fn failed_delivery_is_dropped_by_default() {
    let broker = broker_with_db().await;
    let consumer = EmailConsumer::new(
        broker.clone(),
        Arc::new(RecordingMailer::failing()),
        ConsumerOptions::default(),
    );
    broker
        .publish(
            EXCHANGE,
            ROUTING_KEY,
            &serde_json::to_string(&welcome()).unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        consumer.run_once().await.unwrap(),
        Some(Handled::Failed { requeued: false })
    );
    assert_eq!(consumer.run_once().await.unwrap(), None);
}

#[tokio::test]
async fn failed_delivery_can_be_requeued() {
    let broker = broker_with_db().await;
    let consumer = EmailConsumer::new(
        broker.clone(),
        Arc::new(RecordingMailer::failing()),
        ConsumerOptions {
            requeue_on_failure: true,
            ..ConsumerOptions::default()
        },
    );
    broker
        .publish(
            EXCHANGE,
            ROUTING_KEY,
            &serde_json::to_string(&welcome()).unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        consumer.run_once().await.unwrap(),
        Some(Handled::Failed { requeued: true })
    );
    let again = broker.receive(QUEUE).await.unwrap().unwrap();
    assert!(again.redelivered);
}

#[tokio::test]
async fn background_consumer_eventually_sends() {
    let broker = broker_with_db().await;
    let bridge = NotificationBridge::connect(broker.clone()).await.unwrap();
    let mailer = Arc::new(RecordingMailer::default());
    let consumer = EmailConsumer::new(
        broker.clone(),
        mailer.clone(),
        ConsumerOptions {
            poll_interval: Duration::from_millis(10),
            ..ConsumerOptions::default()
        },
    );
    let handle = tokio::spawn(consumer.run());

    bridge.send_email(welcome()).await.unwrap();

    let sent = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let sent = mailer.sent();
            if !sent.is_empty() {
                return sent;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();
    handle.abort();

    // At-least-once: duplicates are allowed, loss is not.
    assert!(sent.iter().all(|email| email == &welcome()));
}

#[tokio::test]
async fn requeued_failure_does_not_block_later_messages() {
    let broker = broker_with_db().await;
    let mailer = Arc::new(RecordingMailer::rejecting("bad@example.com"));
    let consumer = EmailConsumer::new(
        broker.clone(),
        mailer.clone(),
        ConsumerOptions {
            requeue_on_failure: true,
            ..ConsumerOptions::default()
        },
    );
    publish(&broker, &email_to("bad@example.com")).await;
    publish(&broker, &welcome()).await;

    assert_eq!(
        consumer.run_once().await.unwrap(),
        Some(Handled::Failed { requeued: true })
    );
    assert_eq!(consumer.run_once().await.unwrap(), Some(Handled::Sent));
    assert_eq!(mailer.sent(), vec![welcome()]);

    // The failed message is still there, now at the head again.
    let again = broker.receive(QUEUE).await.unwrap().unwrap();
    assert!(again.redelivered);
    assert!(again.payload.contains("bad@example.com"));
}

#[tokio::test]
async fn requeued_failure_is_hidden_for_its_backoff() {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    BrokerMigrator::up(&db, None).await.unwrap();
    let broker = SqlBroker::new(db).with_requeue_backoff(Backoff::new(
        Duration::from_millis(200),
        Duration::from_secs(5),
    ));
    declare_topology(&broker).await.unwrap();
    let broker = Arc::new(broker);
    let consumer = EmailConsumer::new(
        broker.clone(),
        Arc::new(RecordingMailer::failing()),
        ConsumerOptions {
            requeue_on_failure: true,
            ..ConsumerOptions::default()
        },
    );
    publish(&broker, &welcome()).await;

    assert_eq!(
        consumer.run_once().await.unwrap(),
        Some(Handled::Failed { requeued: true })
    );
    assert_eq!(consumer.run_once().await.unwrap(), None);

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert!(broker.receive(QUEUE).await.unwrap().unwrap().redelivered);
}

#[tokio::test]
async fn background_consumer_backs_off_after_failures() {
    let broker = broker_with_db().await;
    let mailer = Arc::new(RecordingMailer::failing());
    let consumer = EmailConsumer::new(
        broker.clone(),
        mailer.clone(),
        ConsumerOptions {
            poll_interval: Duration::from_millis(10),
            requeue_on_failure: true,
            failure_backoff: Backoff::new(Duration::from_millis(50), Duration::from_secs(1)),
        },
    );
    publish(&broker, &welcome()).await;

    let handle = tokio::spawn(consumer.run());
    tokio::time::sleep(Duration::from_millis(500)).await;
    handle.abort();

    // 50 + 100 + 200 ms of backoff fit in the window, a few attempts at most.
    let attempts = mailer.attempts();
    assert!(attempts >= 1, "consumer never tried");
    assert!(attempts <= 6, "consumer retried {attempts} times in 500ms");
}
