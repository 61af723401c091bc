//! Durable message broker schema.
//!
//! Mirrors an AMQP-style topology so the exchange/queue/routing-key contract
//! survives unchanged:
//!
//! - `broker_exchanges`: declared exchanges and their kind
//! - `broker_queues`: declared queues
//! - `broker_bindings`: queue bound to an exchange through a routing key
//! - `broker_messages`: messages routed into a queue, leased while in flight

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum BrokerExchanges {
    Table,
    Name,
    Kind,
    Durable,
}

#[derive(Iden)]
enum BrokerQueues {
    Table,
    Name,
    Durable,
}

#[derive(Iden)]
enum BrokerBindings {
    Table,
    Exchange,
    RoutingKey,
    Queue,
}

#[derive(Iden)]
enum BrokerMessages {
    Table,
    Id,
    Queue,
    Exchange,
    RoutingKey,
    Payload,
    EnqueuedAt,
    LeasedUntil,
    Deliveries,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BrokerExchanges::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BrokerExchanges::Name)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BrokerExchanges::Kind).string().not_null())
                    .col(ColumnDef::new(BrokerExchanges::Durable).boolean().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BrokerQueues::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BrokerQueues::Name)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BrokerQueues::Durable).boolean().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BrokerBindings::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(BrokerBindings::Exchange).string().not_null())
                    .col(ColumnDef::new(BrokerBindings::RoutingKey).string().not_null())
                    .col(ColumnDef::new(BrokerBindings::Queue).string().not_null())
                    .primary_key(
                        Index::create()
                            .col(BrokerBindings::Exchange)
                            .col(BrokerBindings::RoutingKey)
                            .col(BrokerBindings::Queue),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-broker_bindings-exchange")
                            .from(BrokerBindings::Table, BrokerBindings::Exchange)
                            .to(BrokerExchanges::Table, BrokerExchanges::Name)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-broker_bindings-queue")
                            .from(BrokerBindings::Table, BrokerBindings::Queue)
                            .to(BrokerQueues::Table, BrokerQueues::Name)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BrokerMessages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BrokerMessages::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BrokerMessages::Queue).string().not_null())
                    .col(ColumnDef::new(BrokerMessages::Exchange).string().not_null())
                    .col(ColumnDef::new(BrokerMessages::RoutingKey).string().not_null())
                    .col(ColumnDef::new(BrokerMessages::Payload).text().not_null())
                    .col(
                        ColumnDef::new(BrokerMessages::EnqueuedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(BrokerMessages::LeasedUntil).big_integer())
                    .col(
                        ColumnDef::new(BrokerMessages::Deliveries)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-broker_messages-queue")
                            .from(BrokerMessages::Table, BrokerMessages::Queue)
                            .to(BrokerQueues::Table, BrokerQueues::Name)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-broker_messages-queue-enqueued_at")
                    .table(BrokerMessages::Table)
                    .col(BrokerMessages::Queue)
                    .col(BrokerMessages::EnqueuedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BrokerMessages::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BrokerBindings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BrokerQueues::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BrokerExchanges::Table).to_owned())
            .await?;
        Ok(())
    }
}
