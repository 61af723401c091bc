//! User store schema.
//!
//! - `users`: canonical profiles (name, email, profile image url)
//! - `user_trips`: membership of users in trips, with a per-trip display name
//!
//! `user_trips.trip_id` points into the plan store and therefore carries no
//! foreign key.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Name,
    Email,
    Profile,
    CreatedAt,
}

#[derive(Iden)]
enum UserTrips {
    Table,
    UserId,
    TripId,
    DisplayName,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Users::Name).string().not_null())
                    .col(ColumnDef::new(Users::Email).string().not_null())
                    .col(ColumnDef::new(Users::Profile).string().not_null().default(""))
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uidx-users-email")
                    .table(Users::Table)
                    .col(Users::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserTrips::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(UserTrips::UserId).string().not_null())
                    .col(ColumnDef::new(UserTrips::TripId).string().not_null())
                    .col(
                        ColumnDef::new(UserTrips::DisplayName)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .primary_key(
                        Index::create()
                            .col(UserTrips::UserId)
                            .col(UserTrips::TripId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-user_trips-user_id")
                            .from(UserTrips::Table, UserTrips::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-user_trips-trip_id")
                    .table(UserTrips::Table)
                    .col(UserTrips::TripId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserTrips::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
