//! The module contains `Trip`, the root of the plan hierarchy.

use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    ChangeType, EngineError, ResultEngine,
    util::{dedup_ids, from_json, normalize_optional_text, parse_uuid, to_json},
};

/// A trip and the set of whiteboards (days) it owns.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    /// Image URL; uploads are handled outside the store.
    pub image: String,
    pub whiteboards: Vec<Uuid>,
}

/// Fields of a trip about to be created.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TripNew {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub whiteboards: Vec<Uuid>,
}

impl Trip {
    pub fn new(fields: TripNew) -> ResultEngine<Self> {
        let name = fields.name.trim();
        if name.is_empty() {
            return Err(EngineError::InvalidInput(
                "trip name must not be empty".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: fields.description,
            image: String::new(),
            whiteboards: dedup_ids(&fields.whiteboards),
        })
    }
}

/// Update of a trip. Empty name/description keep the stored value.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TripUpdate {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub whiteboards: Vec<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change: Option<ChangeType>,
}

impl TripUpdate {
    pub fn whiteboards(change: ChangeType, whiteboards: Vec<Uuid>) -> Self {
        Self {
            whiteboards,
            change: Some(change),
            ..Self::default()
        }
    }

    pub(crate) fn apply_to(&self, trip: &mut Trip) -> ResultEngine<()> {
        let name = normalize_optional_text(Some(self.name.as_str()));
        let description = normalize_optional_text(Some(self.description.as_str()));
        if name.is_none() && description.is_none() && self.change.is_none() {
            return Err(EngineError::InvalidInput(
                "no update operations provided".to_string(),
            ));
        }
        if let Some(name) = name {
            trip.name = name;
        }
        if let Some(description) = description {
            trip.description = description;
        }
        if let Some(change) = self.change {
            change.apply(&mut trip.whiteboards, &self.whiteboards);
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "trips")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub description: String,
    pub image: String,
    pub whiteboards: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<&Trip> for ActiveModel {
    type Error = EngineError;

    fn try_from(trip: &Trip) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ActiveValue::Set(trip.id.to_string()),
            name: ActiveValue::Set(trip.name.clone()),
            description: ActiveValue::Set(trip.description.clone()),
            image: ActiveValue::Set(trip.image.clone()),
            whiteboards: ActiveValue::Set(to_json(&trip.whiteboards, "whiteboards")?),
        })
    }
}

impl TryFrom<Model> for Trip {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "trip")?,
            name: model.name,
            description: model.description,
            image: model.image,
            whiteboards: from_json(&model.whiteboards, "whiteboards")?,
        })
    }
}
