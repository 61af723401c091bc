//! Users table.
//!
//! A user is the canonical profile (name and profile image) shown for a
//! member unless the trip overrides the display name.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    /// Profile image URL.
    pub profile: String,
    pub created_at: DateTime<Utc>,
}

/// Fields of a user about to be registered.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserNew {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub profile: String,
}

impl User {
    /// Build a user. The email is only checked for shape here; the caller
    /// validates it as a mailbox before it reaches the store.
    pub fn new(fields: UserNew) -> ResultEngine<Self> {
        let name = fields.name.trim();
        if name.is_empty() {
            return Err(EngineError::InvalidInput(
                "user name must not be empty".to_string(),
            ));
        }
        let email = fields.email.trim().to_lowercase();
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {}
            _ => {
                return Err(EngineError::InvalidInput(format!(
                    "invalid email: {}",
                    fields.email
                )));
            }
        }
        Ok(Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email,
            profile: fields.profile,
            created_at: Utc::now(),
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub email: String,
    pub profile: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user_trips::Entity")]
    UserTrips,
}

impl Related<super::user_trips::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserTrips.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&User> for ActiveModel {
    fn from(user: &User) -> Self {
        Self {
            id: ActiveValue::Set(user.id.to_string()),
            name: ActiveValue::Set(user.name.clone()),
            email: ActiveValue::Set(user.email.clone()),
            profile: ActiveValue::Set(user.profile.clone()),
            created_at: ActiveValue::Set(user.created_at),
        }
    }
}

impl TryFrom<Model> for User {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "user")?,
            name: model.name,
            email: model.email,
            profile: model.profile,
            created_at: model.created_at,
        })
    }
}
