use async_trait::async_trait;
use sea_orm::{QueryFilter, TransactionTrait, prelude::*};
use tracing::debug;
use uuid::Uuid;

use crate::{
    EngineError, Pin, PinNew, PinStore, PinUpdate, ResultEngine, order_by_ids, pins,
    util::id_strings,
};

use super::{PlanEngine, with_tx};

fn pin_not_found(id: Uuid) -> EngineError {
    EngineError::KeyNotFound(format!("pin {id}"))
}

#[async_trait]
impl PinStore for PlanEngine {
    async fn create_pin(&self, fields: PinNew) -> ResultEngine<Uuid> {
        let pin = Pin::new(fields)?;
        pins::ActiveModel::try_from(&pin)?
            .insert(&self.database)
            .await?;
        debug!(pin_id = %pin.id, "pin created");
        Ok(pin.id)
    }

    async fn get_pin(&self, id: Uuid) -> ResultEngine<Pin> {
        let model = pins::Entity::find_by_id(id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| pin_not_found(id))?;
        Pin::try_from(model)
    }

    async fn find_pins(&self, ids: &[Uuid]) -> ResultEngine<Vec<Pin>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = pins::Entity::find()
            .filter(pins::Column::Id.is_in(id_strings(ids)))
            .all(&self.database)
            .await?
            .into_iter()
            .map(Pin::try_from)
            .collect::<ResultEngine<Vec<_>>>()?;
        Ok(order_by_ids(ids, rows, |pin| pin.id))
    }

    async fn find_pins_by_participant(&self, user_id: Uuid) -> ResultEngine<Vec<Pin>> {
        // Participants are a JSON array: narrow with LIKE, then check exactly.
        let rows = pins::Entity::find()
            .filter(pins::Column::Participants.contains(user_id.to_string()))
            .all(&self.database)
            .await?;
        let mut out = Vec::with_capacity(rows.len());
        for model in rows {
            let pin = Pin::try_from(model)?;
            if pin.participants.contains(&user_id) {
                out.push(pin);
            }
        }
        Ok(out)
    }

    async fn update_pin(&self, id: Uuid, update: PinUpdate) -> ResultEngine<Pin> {
        if update.is_empty() {
            return Err(EngineError::InvalidInput(
                "no update operations provided".to_string(),
            ));
        }
        with_tx!(self, |db_tx| {
            let model = pins::Entity::find_by_id(id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| pin_not_found(id))?;
            let mut pin = Pin::try_from(model)?;
            pin.apply(update)?;
            pins::ActiveModel::try_from(&pin)?.update(&db_tx).await?;
            Ok(pin)
        })
    }

    async fn delete_pin(&self, id: Uuid) -> ResultEngine<()> {
        let res = pins::Entity::delete_by_id(id.to_string())
            .exec(&self.database)
            .await?;
        if res.rows_affected == 0 {
            return Err(pin_not_found(id));
        }
        debug!(pin_id = %id, "pin deleted");
        Ok(())
    }

    async fn delete_pins(&self, ids: &[Uuid]) -> ResultEngine<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let res = pins::Entity::delete_many()
            .filter(pins::Column::Id.is_in(id_strings(ids)))
            .exec(&self.database)
            .await?;
        debug!(requested = ids.len(), deleted = res.rows_affected, "pins deleted");
        Ok(res.rows_affected)
    }
}
