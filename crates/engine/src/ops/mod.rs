use sea_orm::DatabaseConnection;

use crate::ResultEngine;

mod memberships;
mod pins;
mod trips;
mod users;
mod whiteboards;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
///
/// Inside the block only the transaction may be used: an in-memory SQLite
/// pool has a single connection.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// The plan store: pins, whiteboards and trips in one database.
#[derive(Debug, Clone)]
pub struct PlanEngine {
    database: DatabaseConnection,
}

impl PlanEngine {
    /// Return a builder for `PlanEngine`.
    pub fn builder() -> PlanEngineBuilder {
        PlanEngineBuilder::default()
    }
}

/// The builder for `PlanEngine`
#[derive(Default)]
pub struct PlanEngineBuilder {
    database: DatabaseConnection,
}

impl PlanEngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> PlanEngineBuilder {
        self.database = db;
        self
    }

    /// Construct `PlanEngine`
    pub async fn build(self) -> ResultEngine<PlanEngine> {
        Ok(PlanEngine {
            database: self.database,
        })
    }
}

/// The user store: profiles and trip memberships in one database.
#[derive(Debug, Clone)]
pub struct UserEngine {
    database: DatabaseConnection,
}

impl UserEngine {
    /// Return a builder for `UserEngine`.
    pub fn builder() -> UserEngineBuilder {
        UserEngineBuilder::default()
    }
}

/// The builder for `UserEngine`
#[derive(Default)]
pub struct UserEngineBuilder {
    database: DatabaseConnection,
}

impl UserEngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> UserEngineBuilder {
        self.database = db;
        self
    }

    /// Construct `UserEngine`
    pub async fn build(self) -> ResultEngine<UserEngine> {
        Ok(UserEngine {
            database: self.database,
        })
    }
}
