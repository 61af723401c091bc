//! Table-backed [`Broker`] on `sea-orm`.
//!
//! Messages are rows in `broker_messages`, one per routed queue. A receive
//! leases the oldest deliverable row; ack deletes it, reject either deletes it
//! or moves it to the back of its queue, optionally hidden for a backoff delay
//! that grows with each delivery. A consumer that dies mid-message leaves the
//! lease to expire, after which the row is handed out again.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveValue, Condition, DatabaseConnection, QueryFilter, QueryOrder, TransactionTrait,
    prelude::*,
};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{Backoff, Broker, Delivery, ExchangeKind, NotificationError, ResultNotification};

mod exchanges {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "broker_exchanges")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub name: String,
        pub kind: String,
        pub durable: bool,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

mod queues {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "broker_queues")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub name: String,
        pub durable: bool,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

mod bindings {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "broker_bindings")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub exchange: String,
        #[sea_orm(primary_key, auto_increment = false)]
        pub routing_key: String,
        #[sea_orm(primary_key, auto_increment = false)]
        pub queue: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

mod messages {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "broker_messages")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub queue: String,
        pub exchange: String,
        pub routing_key: String,
        pub payload: String,
        /// Microseconds since the epoch, strictly increasing per queue.
        pub enqueued_at: i64,
        pub leased_until: Option<i64>,
        pub deliveries: i32,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

fn now_micros() -> i64 {
    Utc::now().timestamp_micros()
}

fn micros(duration: Duration) -> i64 {
    i64::try_from(duration.as_micros()).unwrap_or(i64::MAX)
}

/// Next `enqueued_at` of `queue`, past every message already in it.
async fn tail_of<C: ConnectionTrait>(db: &C, queue: &str) -> ResultNotification<i64> {
    let last = messages::Entity::find()
        .filter(messages::Column::Queue.eq(queue.to_string()))
        .order_by_desc(messages::Column::EnqueuedAt)
        .one(db)
        .await?
        .map(|m| m.enqueued_at);
    Ok(match last {
        Some(last) => now_micros().max(last.saturating_add(1)),
        None => now_micros(),
    })
}

#[derive(Debug, Clone)]
pub struct SqlBroker {
    database: DatabaseConnection,
    lease: Duration,
    requeue_backoff: Backoff,
}

impl SqlBroker {
    pub const DEFAULT_LEASE: Duration = Duration::from_secs(30);

    pub fn new(database: DatabaseConnection) -> Self {
        Self {
            database,
            lease: Self::DEFAULT_LEASE,
            requeue_backoff: Backoff::NONE,
        }
    }

    /// How long a received message stays invisible to other receivers.
    pub fn with_lease(mut self, lease: Duration) -> Self {
        self.lease = lease;
        self
    }

    /// How long a requeued message stays hidden, by number of past deliveries.
    pub fn with_requeue_backoff(mut self, backoff: Backoff) -> Self {
        self.requeue_backoff = backoff;
        self
    }
}

#[async_trait]
impl Broker for SqlBroker {
    async fn declare_exchange(&self, name: &str, kind: ExchangeKind) -> ResultNotification<()> {
        let db_tx = self.database.begin().await?;
        match exchanges::Entity::find_by_id(name.to_string())
            .one(&db_tx)
            .await?
        {
            Some(existing) => {
                if ExchangeKind::try_from(existing.kind.as_str())? != kind {
                    return Err(NotificationError::ExchangeMismatch(name.to_string()));
                }
            }
            None => {
                exchanges::ActiveModel {
                    name: ActiveValue::Set(name.to_string()),
                    kind: ActiveValue::Set(kind.as_str().to_string()),
                    durable: ActiveValue::Set(true),
                }
                .insert(&db_tx)
                .await?;
                debug!(exchange = name, kind = kind.as_str(), "exchange declared");
            }
        }
        db_tx.commit().await?;
        Ok(())
    }

    async fn declare_queue(&self, name: &str, durable: bool) -> ResultNotification<()> {
        let db_tx = self.database.begin().await?;
        if queues::Entity::find_by_id(name.to_string())
            .one(&db_tx)
            .await?
            .is_none()
        {
            queues::ActiveModel {
                name: ActiveValue::Set(name.to_string()),
                durable: ActiveValue::Set(durable),
            }
            .insert(&db_tx)
            .await?;
            debug!(queue = name, "queue declared");
        }
        db_tx.commit().await?;
        Ok(())
    }

    async fn bind_queue(
        &self,
        queue: &str,
        exchange: &str,
        routing_key: &str,
    ) -> ResultNotification<()> {
        let db_tx = self.database.begin().await?;
        if exchanges::Entity::find_by_id(exchange.to_string())
            .one(&db_tx)
            .await?
            .is_none()
        {
            return Err(NotificationError::UnknownExchange(exchange.to_string()));
        }
        if queues::Entity::find_by_id(queue.to_string())
            .one(&db_tx)
            .await?
            .is_none()
        {
            return Err(NotificationError::UnknownQueue(queue.to_string()));
        }
        let key = (
            exchange.to_string(),
            routing_key.to_string(),
            queue.to_string(),
        );
        if bindings::Entity::find_by_id(key).one(&db_tx).await?.is_none() {
            bindings::ActiveModel {
                exchange: ActiveValue::Set(exchange.to_string()),
                routing_key: ActiveValue::Set(routing_key.to_string()),
                queue: ActiveValue::Set(queue.to_string()),
            }
            .insert(&db_tx)
            .await?;
            debug!(queue, exchange, routing_key, "queue bound");
        }
        db_tx.commit().await?;
        Ok(())
    }

    async fn publish(
        &self,
        exchange: &str,
        routing_key: &str,
        payload: &str,
    ) -> ResultNotification<usize> {
        let db_tx = self.database.begin().await?;
        let declared = exchanges::Entity::find_by_id(exchange.to_string())
            .one(&db_tx)
            .await?
            .ok_or_else(|| NotificationError::UnknownExchange(exchange.to_string()))?;

        let mut select =
            bindings::Entity::find().filter(bindings::Column::Exchange.eq(exchange.to_string()));
        if ExchangeKind::try_from(declared.kind.as_str())? == ExchangeKind::Direct {
            select = select.filter(bindings::Column::RoutingKey.eq(routing_key.to_string()));
        }
        let mut targets: Vec<String> = select
            .all(&db_tx)
            .await?
            .into_iter()
            .map(|binding| binding.queue)
            .collect();
        targets.sort();
        targets.dedup();

        for queue in &targets {
            let enqueued_at = tail_of(&db_tx, queue).await?;
            messages::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4().to_string()),
                queue: ActiveValue::Set(queue.clone()),
                exchange: ActiveValue::Set(exchange.to_string()),
                routing_key: ActiveValue::Set(routing_key.to_string()),
                payload: ActiveValue::Set(payload.to_string()),
                enqueued_at: ActiveValue::Set(enqueued_at),
                leased_until: ActiveValue::Set(None),
                deliveries: ActiveValue::Set(0),
            }
            .insert(&db_tx)
            .await?;
        }
        db_tx.commit().await?;

        if targets.is_empty() {
            warn!(exchange, routing_key, "message published without a matching queue");
        }
        Ok(targets.len())
    }

    async fn receive(&self, queue: &str) -> ResultNotification<Option<Delivery>> {
        let now = now_micros();
        let db_tx = self.database.begin().await?;
        if queues::Entity::find_by_id(queue.to_string())
            .one(&db_tx)
            .await?
            .is_none()
        {
            return Err(NotificationError::UnknownQueue(queue.to_string()));
        }

        let Some(model) = messages::Entity::find()
            .filter(messages::Column::Queue.eq(queue.to_string()))
            .filter(
                Condition::any()
                    .add(messages::Column::LeasedUntil.is_null())
                    .add(messages::Column::LeasedUntil.lte(now)),
            )
            .order_by_asc(messages::Column::EnqueuedAt)
            .one(&db_tx)
            .await?
        else {
            db_tx.commit().await?;
            return Ok(None);
        };

        let delivery = Delivery {
            tag: model.id.clone(),
            exchange: model.exchange.clone(),
            routing_key: model.routing_key.clone(),
            payload: model.payload.clone(),
            redelivered: model.deliveries > 0,
        };
        let deliveries = model.deliveries;
        let mut active: messages::ActiveModel = model.into();
        active.leased_until = ActiveValue::Set(Some(now.saturating_add(micros(self.lease))));
        active.deliveries = ActiveValue::Set(deliveries.saturating_add(1));
        active.update(&db_tx).await?;
        db_tx.commit().await?;

        Ok(Some(delivery))
    }

    async fn ack(&self, tag: &str) -> ResultNotification<()> {
        let res = messages::Entity::delete_by_id(tag.to_string())
            .exec(&self.database)
            .await?;
        if res.rows_affected == 0 {
            return Err(NotificationError::UnknownDelivery(tag.to_string()));
        }
        Ok(())
    }

    async fn reject(&self, tag: &str, requeue: bool) -> ResultNotification<()> {
        if !requeue {
            return self.ack(tag).await;
        }
        let db_tx = self.database.begin().await?;
        let model = messages::Entity::find_by_id(tag.to_string())
            .one(&db_tx)
            .await?
            .ok_or_else(|| NotificationError::UnknownDelivery(tag.to_string()))?;

        let attempt = u32::try_from(model.deliveries.saturating_sub(1)).unwrap_or(0);
        let delay = self.requeue_backoff.delay_for_attempt(attempt);
        let enqueued_at = tail_of(&db_tx, &model.queue).await?;
        let leased_until = (!delay.is_zero()).then(|| now_micros().saturating_add(micros(delay)));

        let mut active: messages::ActiveModel = model.into();
        active.enqueued_at = ActiveValue::Set(enqueued_at);
        active.leased_until = ActiveValue::Set(leased_until);
        active.update(&db_tx).await?;
        db_tx.commit().await?;

        debug!(tag, ?delay, "message requeued at the tail");
        Ok(())
    }
}
