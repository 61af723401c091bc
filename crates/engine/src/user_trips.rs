//! Membership of users in trips (`user_trips` join table).

use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, util::parse_uuid};

/// A user's membership in a trip.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub user_id: Uuid,
    pub trip_id: Uuid,
    /// Per-trip name override; empty means "use the profile name".
    #[serde(default)]
    pub display_name: String,
}

impl Membership {
    pub fn new(user_id: Uuid, trip_id: Uuid) -> Self {
        Self {
            user_id,
            trip_id,
            display_name: String::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "user_trips")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub trip_id: String,
    pub display_name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Membership> for ActiveModel {
    fn from(membership: &Membership) -> Self {
        Self {
            user_id: ActiveValue::Set(membership.user_id.to_string()),
            trip_id: ActiveValue::Set(membership.trip_id.to_string()),
            display_name: ActiveValue::Set(membership.display_name.clone()),
        }
    }
}

impl TryFrom<Model> for Membership {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: parse_uuid(&model.user_id, "user")?,
            trip_id: parse_uuid(&model.trip_id, "trip")?,
            display_name: model.display_name,
        })
    }
}
