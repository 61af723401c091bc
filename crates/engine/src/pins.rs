//! The module contains `Pin`, the leaf of a day plan.

use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine,
    util::{from_json, parse_uuid, to_json},
};

/// One expense line attached to a pin.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    /// The participant the expense belongs to.
    pub id: Uuid,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub expense: f64,
}

/// A stop inside a whiteboard.
///
/// Pins never know which whiteboard holds them: the link lives only in
/// `Whiteboard::pins`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pin {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub expenses: Vec<Expense>,
    pub location: f64,
    /// Other pins this one follows from.
    pub parents: Vec<Uuid>,
    /// Users taking part in this stop.
    pub participants: Vec<Uuid>,
}

/// Fields of a pin about to be created. `PinNew::default()` is the empty
/// placeholder pin every new whiteboard starts with.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PinNew {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub expenses: Vec<Expense>,
    #[serde(default)]
    pub location: f64,
    #[serde(default)]
    pub parents: Vec<Uuid>,
    #[serde(default)]
    pub participants: Vec<Uuid>,
}

/// Partial update of a pin. `None` leaves the field untouched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PinUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expenses: Option<Vec<Expense>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parents: Option<Vec<Uuid>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participants: Option<Vec<Uuid>>,
}

impl PinUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.expenses.is_none()
            && self.location.is_none()
            && self.parents.is_none()
            && self.participants.is_none()
    }
}

impl Pin {
    pub fn new(fields: PinNew) -> ResultEngine<Self> {
        if !fields.location.is_finite() {
            return Err(EngineError::InvalidInput(
                "pin location must be a finite number".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            name: fields.name.trim().to_string(),
            description: fields.description,
            expenses: fields.expenses,
            location: fields.location,
            parents: fields.parents,
            participants: fields.participants,
        })
    }

    pub(crate) fn apply(&mut self, update: PinUpdate) -> ResultEngine<()> {
        if let Some(location) = update.location {
            if !location.is_finite() {
                return Err(EngineError::InvalidInput(
                    "pin location must be a finite number".to_string(),
                ));
            }
            self.location = location;
        }
        if let Some(name) = update.name {
            self.name = name.trim().to_string();
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(expenses) = update.expenses {
            self.expenses = expenses;
        }
        if let Some(parents) = update.parents {
            self.parents = parents;
        }
        if let Some(participants) = update.participants {
            self.participants = participants;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "pins")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub description: String,
    pub expenses: String,
    pub location: f64,
    pub parents: String,
    pub participants: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<&Pin> for ActiveModel {
    type Error = EngineError;

    fn try_from(pin: &Pin) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ActiveValue::Set(pin.id.to_string()),
            name: ActiveValue::Set(pin.name.clone()),
            description: ActiveValue::Set(pin.description.clone()),
            expenses: ActiveValue::Set(to_json(&pin.expenses, "expenses")?),
            location: ActiveValue::Set(pin.location),
            parents: ActiveValue::Set(to_json(&pin.parents, "parents")?),
            participants: ActiveValue::Set(to_json(&pin.participants, "participants")?),
        })
    }
}

impl TryFrom<Model> for Pin {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "pin")?,
            name: model.name,
            description: model.description,
            expenses: from_json(&model.expenses, "expenses")?,
            location: model.location,
            parents: from_json(&model.parents, "parents")?,
            participants: from_json(&model.participants, "participants")?,
        })
    }
}
