//! The module contains `Whiteboard`, one day of a trip.

use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    ChangeType, EngineError, ResultEngine,
    util::{from_json, parse_uuid, to_json},
};

/// A day plan holding an ordered set of pin ids.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Whiteboard {
    pub id: Uuid,
    pub day: i32,
    pub pins: Vec<Uuid>,
}

impl Whiteboard {
    /// A whiteboard always starts with the pin it was created around.
    pub fn new(pin_id: Uuid, day: i32) -> ResultEngine<Self> {
        if day < 1 {
            return Err(EngineError::InvalidInput(format!(
                "whiteboard day must be >= 1, got {day}"
            )));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            day,
            pins: vec![pin_id],
        })
    }
}

/// Update of a whiteboard: an optional pin delta plus an optional new day.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WhiteboardUpdate {
    #[serde(default)]
    pub pins: Vec<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change: Option<ChangeType>,
    /// `0` keeps the current day.
    #[serde(default)]
    pub day: i32,
}

impl WhiteboardUpdate {
    pub fn pins(change: ChangeType, pins: Vec<Uuid>) -> Self {
        Self {
            pins,
            change: Some(change),
            day: 0,
        }
    }

    pub(crate) fn apply_to(&self, whiteboard: &mut Whiteboard) -> ResultEngine<()> {
        if self.change.is_none() && self.day == 0 {
            return Err(EngineError::InvalidInput(
                "no update operations provided".to_string(),
            ));
        }
        if self.day < 0 {
            return Err(EngineError::InvalidInput(format!(
                "whiteboard day must be >= 1, got {}",
                self.day
            )));
        }
        if let Some(change) = self.change {
            let mut pins = whiteboard.pins.clone();
            change.apply(&mut pins, &self.pins);
            if pins.is_empty() {
                return Err(EngineError::InvalidInput(format!(
                    "whiteboard {} must keep at least one pin",
                    whiteboard.id
                )));
            }
            whiteboard.pins = pins;
        }
        if self.day != 0 {
            whiteboard.day = self.day;
        }
        Ok(())
    }
}

/// Outcome of a whiteboard cascade delete.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadeReport {
    pub pins_deleted: u64,
    pub whiteboards_deleted: u64,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "whiteboards")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub day: i32,
    pub pins: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<&Whiteboard> for ActiveModel {
    type Error = EngineError;

    fn try_from(whiteboard: &Whiteboard) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ActiveValue::Set(whiteboard.id.to_string()),
            day: ActiveValue::Set(whiteboard.day),
            pins: ActiveValue::Set(to_json(&whiteboard.pins, "pins")?),
        })
    }
}

impl TryFrom<Model> for Whiteboard {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "whiteboard")?,
            day: model.day,
            pins: from_json(&model.pins, "pins")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_update_is_rejected() {
        let mut wb = Whiteboard::new(Uuid::new_v4(), 1).unwrap();
        let err = WhiteboardUpdate::default().apply_to(&mut wb).unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidInput("no update operations provided".to_string())
        );
    }

    #[test]
    fn zero_day_keeps_current_day() {
        let pin = Uuid::new_v4();
        let mut wb = Whiteboard::new(pin, 3).unwrap();
        let other = Uuid::new_v4();
        WhiteboardUpdate::pins(ChangeType::Add, vec![other])
            .apply_to(&mut wb)
            .unwrap();
        assert_eq!(wb.day, 3);
        assert_eq!(wb.pins, vec![pin, other]);
    }

    #[test]
    fn removing_every_pin_is_rejected() {
        let pin = Uuid::new_v4();
        let mut wb = Whiteboard::new(pin, 2).unwrap();

        let err = WhiteboardUpdate::pins(ChangeType::Remove, vec![pin])
            .apply_to(&mut wb)
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));

        let err = WhiteboardUpdate {
            pins: Vec::new(),
            change: Some(ChangeType::Set),
            day: 5,
        }
        .apply_to(&mut wb)
        .unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));

        // Nothing applied on rejection.
        assert_eq!(wb.pins, vec![pin]);
        assert_eq!(wb.day, 2);
    }
}
