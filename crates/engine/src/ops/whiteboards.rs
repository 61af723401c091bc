use async_trait::async_trait;
use sea_orm::{QueryFilter, TransactionTrait, prelude::*};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    CascadeReport, EngineError, ResultEngine, Whiteboard, WhiteboardStore, WhiteboardUpdate,
    order_by_ids, pins,
    util::{dedup_ids, id_strings},
    whiteboards,
};

use super::{PlanEngine, with_tx};

fn whiteboard_not_found(id: Uuid) -> EngineError {
    EngineError::KeyNotFound(format!("whiteboard {id}"))
}

#[async_trait]
impl WhiteboardStore for PlanEngine {
    async fn create_whiteboard(&self, pin_id: Uuid, day: i32) -> ResultEngine<Uuid> {
        let whiteboard = Whiteboard::new(pin_id, day)?;
        with_tx!(self, |db_tx| {
            if pins::Entity::find_by_id(pin_id.to_string())
                .one(&db_tx)
                .await?
                .is_none()
            {
                return Err(EngineError::KeyNotFound(format!("pin {pin_id}")));
            }
            whiteboards::ActiveModel::try_from(&whiteboard)?
                .insert(&db_tx)
                .await?;
            Ok::<_, EngineError>(())
        })?;
        debug!(whiteboard_id = %whiteboard.id, %pin_id, day, "whiteboard created");
        Ok(whiteboard.id)
    }

    async fn get_whiteboard(&self, id: Uuid) -> ResultEngine<Whiteboard> {
        let model = whiteboards::Entity::find_by_id(id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| whiteboard_not_found(id))?;
        Whiteboard::try_from(model)
    }

    async fn find_whiteboards(&self, ids: &[Uuid]) -> ResultEngine<Vec<Whiteboard>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = whiteboards::Entity::find()
            .filter(whiteboards::Column::Id.is_in(id_strings(ids)))
            .all(&self.database)
            .await?
            .into_iter()
            .map(Whiteboard::try_from)
            .collect::<ResultEngine<Vec<_>>>()?;
        Ok(order_by_ids(ids, rows, |wb| wb.id))
    }

    async fn update_whiteboard(
        &self,
        id: Uuid,
        update: WhiteboardUpdate,
    ) -> ResultEngine<Whiteboard> {
        with_tx!(self, |db_tx| {
            let model = whiteboards::Entity::find_by_id(id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| whiteboard_not_found(id))?;
            let mut whiteboard = Whiteboard::try_from(model)?;
            update.apply_to(&mut whiteboard)?;
            whiteboards::ActiveModel::try_from(&whiteboard)?
                .update(&db_tx)
                .await?;
            Ok(whiteboard)
        })
    }

    async fn delete_whiteboard(&self, id: Uuid) -> ResultEngine<()> {
        let res = whiteboards::Entity::delete_by_id(id.to_string())
            .exec(&self.database)
            .await?;
        if res.rows_affected == 0 {
            return Err(whiteboard_not_found(id));
        }
        Ok(())
    }

    async fn delete_whiteboards_cascade(&self, ids: &[Uuid]) -> ResultEngine<CascadeReport> {
        if ids.is_empty() {
            return Ok(CascadeReport::default());
        }
        let report = with_tx!(self, |db_tx| {
            let boards = whiteboards::Entity::find()
                .filter(whiteboards::Column::Id.is_in(id_strings(ids)))
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Whiteboard::try_from)
                .collect::<ResultEngine<Vec<_>>>()?;

            let pin_ids: Vec<Uuid> =
                dedup_ids(&boards.iter().flat_map(|wb| wb.pins.clone()).collect::<Vec<_>>());

            let mut report = CascadeReport::default();
            if !pin_ids.is_empty() {
                report.pins_deleted = pins::Entity::delete_many()
                    .filter(pins::Column::Id.is_in(id_strings(&pin_ids)))
                    .exec(&db_tx)
                    .await?
                    .rows_affected;
            }
            report.whiteboards_deleted = whiteboards::Entity::delete_many()
                .filter(whiteboards::Column::Id.is_in(id_strings(ids)))
                .exec(&db_tx)
                .await?
                .rows_affected;
            Ok::<_, EngineError>(report)
        })?;
        info!(
            requested = ids.len(),
            pins_deleted = report.pins_deleted,
            whiteboards_deleted = report.whiteboards_deleted,
            "whiteboard cascade delete"
        );
        Ok(report)
    }
}
