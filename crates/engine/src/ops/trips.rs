use async_trait::async_trait;
use sea_orm::{QueryFilter, TransactionTrait, prelude::*};
use tracing::debug;
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, Trip, TripNew, TripStore, TripUpdate, order_by_ids, trips,
    util::id_strings, whiteboards,
};

use super::{PlanEngine, with_tx};

fn trip_not_found(id: Uuid) -> EngineError {
    EngineError::KeyNotFound(format!("trip {id}"))
}

#[async_trait]
impl TripStore for PlanEngine {
    async fn create_trip(&self, fields: TripNew) -> ResultEngine<Uuid> {
        let trip = Trip::new(fields)?;
        with_tx!(self, |db_tx| {
            if !trip.whiteboards.is_empty() {
                let found = whiteboards::Entity::find()
                    .filter(whiteboards::Column::Id.is_in(id_strings(&trip.whiteboards)))
                    .count(&db_tx)
                    .await?;
                if found != trip.whiteboards.len() as u64 {
                    return Err(EngineError::KeyNotFound(
                        "trip references a missing whiteboard".to_string(),
                    ));
                }
            }
            trips::ActiveModel::try_from(&trip)?.insert(&db_tx).await?;
            Ok::<_, EngineError>(())
        })?;
        debug!(trip_id = %trip.id, whiteboards = trip.whiteboards.len(), "trip created");
        Ok(trip.id)
    }

    async fn get_trip(&self, id: Uuid) -> ResultEngine<Trip> {
        let model = trips::Entity::find_by_id(id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| trip_not_found(id))?;
        Trip::try_from(model)
    }

    async fn find_trips(&self, ids: &[Uuid]) -> ResultEngine<Vec<Trip>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = trips::Entity::find()
            .filter(trips::Column::Id.is_in(id_strings(ids)))
            .all(&self.database)
            .await?
            .into_iter()
            .map(Trip::try_from)
            .collect::<ResultEngine<Vec<_>>>()?;
        Ok(order_by_ids(ids, rows, |trip| trip.id))
    }

    async fn update_trip(&self, id: Uuid, update: TripUpdate) -> ResultEngine<Trip> {
        with_tx!(self, |db_tx| {
            let model = trips::Entity::find_by_id(id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| trip_not_found(id))?;
            let mut trip = Trip::try_from(model)?;
            update.apply_to(&mut trip)?;
            trips::ActiveModel::try_from(&trip)?.update(&db_tx).await?;
            Ok(trip)
        })
    }

    async fn delete_trip(&self, id: Uuid) -> ResultEngine<()> {
        let res = trips::Entity::delete_by_id(id.to_string())
            .exec(&self.database)
            .await?;
        if res.rows_affected == 0 {
            return Err(trip_not_found(id));
        }
        debug!(trip_id = %id, "trip deleted");
        Ok(())
    }
}
