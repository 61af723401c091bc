//! Plan store schema.
//!
//! - `pins`: leaf stops of a day plan
//! - `whiteboards`: one day of a trip, holding an ordered set of pin ids
//! - `trips`: named trips holding a set of whiteboard ids
//!
//! Parent/child links are stored as JSON arrays of ids on the parent row,
//! never as foreign keys: the plan store does not enforce them.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Pins {
    Table,
    Id,
    Name,
    Description,
    Expenses,
    Location,
    Parents,
    Participants,
}

#[derive(Iden)]
enum Whiteboards {
    Table,
    Id,
    Day,
    Pins,
}

#[derive(Iden)]
enum Trips {
    Table,
    Id,
    Name,
    Description,
    Image,
    Whiteboards,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Pins::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Pins::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Pins::Name).string().not_null().default(""))
                    .col(
                        ColumnDef::new(Pins::Description)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Pins::Expenses).text().not_null().default("[]"))
                    .col(ColumnDef::new(Pins::Location).double().not_null().default(0.0))
                    .col(ColumnDef::new(Pins::Parents).text().not_null().default("[]"))
                    .col(
                        ColumnDef::new(Pins::Participants)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Whiteboards::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Whiteboards::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Whiteboards::Day).integer().not_null())
                    .col(
                        ColumnDef::new(Whiteboards::Pins)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Trips::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Trips::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Trips::Name).string().not_null())
                    .col(
                        ColumnDef::new(Trips::Description)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Trips::Image).string().not_null().default(""))
                    .col(
                        ColumnDef::new(Trips::Whiteboards)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Trips::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Whiteboards::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Pins::Table).to_owned())
            .await?;
        Ok(())
    }
}
