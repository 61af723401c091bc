//! Schema migrations.
//!
//! Every store owns its own database, so each one gets its own migrator:
//! running two migrators against the same database is not supported.
pub use sea_orm_migration::prelude::*;

mod m20260301_000001_plan;
mod m20260301_000002_users;
mod m20260301_000003_broker;

/// Migrations of the plan store (pins, whiteboards, trips).
pub struct PlanMigrator;

#[async_trait::async_trait]
impl MigratorTrait for PlanMigrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20260301_000001_plan::Migration)]
    }
}

/// Migrations of the user store (users, memberships).
pub struct UserMigrator;

#[async_trait::async_trait]
impl MigratorTrait for UserMigrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20260301_000002_users::Migration)]
    }
}

/// Migrations of the notification broker.
pub struct BrokerMigrator;

#[async_trait::async_trait]
impl MigratorTrait for BrokerMigrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20260301_000003_broker::Migration)]
    }
}
