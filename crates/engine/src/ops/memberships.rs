use async_trait::async_trait;
use sea_orm::{ActiveValue, QueryFilter, TransactionTrait, prelude::*};
use tracing::debug;
use uuid::Uuid;

use crate::{
    EngineError, Membership, MembershipStore, ResultEngine, user_trips, users,
    util::{dedup_ids, parse_uuid},
};

use super::{UserEngine, with_tx};

fn membership_not_found(trip_id: Uuid, user_id: Uuid) -> EngineError {
    EngineError::KeyNotFound(format!("user {user_id} in trip {trip_id}"))
}

fn membership_key(trip_id: Uuid, user_id: Uuid) -> (String, String) {
    (user_id.to_string(), trip_id.to_string())
}

#[async_trait]
impl MembershipStore for UserEngine {
    async fn create_memberships(&self, trip_id: Uuid, user_ids: &[Uuid]) -> ResultEngine<()> {
        let user_ids = dedup_ids(user_ids);
        if user_ids.is_empty() {
            return Err(EngineError::InvalidInput(
                "at least one user id is required".to_string(),
            ));
        }
        with_tx!(self, |db_tx| {
            for user_id in &user_ids {
                if users::Entity::find_by_id(user_id.to_string())
                    .one(&db_tx)
                    .await?
                    .is_none()
                {
                    return Err(EngineError::KeyNotFound(format!("user {user_id}")));
                }
                if user_trips::Entity::find_by_id(membership_key(trip_id, *user_id))
                    .one(&db_tx)
                    .await?
                    .is_some()
                {
                    return Err(EngineError::ExistingKey(format!(
                        "user {user_id} in trip {trip_id}"
                    )));
                }
                user_trips::ActiveModel::from(&Membership::new(*user_id, trip_id))
                    .insert(&db_tx)
                    .await?;
            }
            debug!(%trip_id, members = user_ids.len(), "memberships created");
            Ok(())
        })
    }

    async fn trips_for_user(&self, user_id: Uuid) -> ResultEngine<Vec<Uuid>> {
        user_trips::Entity::find()
            .filter(user_trips::Column::UserId.eq(user_id.to_string()))
            .all(&self.database)
            .await?
            .into_iter()
            .map(|m| parse_uuid(&m.trip_id, "trip"))
            .collect()
    }

    async fn members_for_trip(&self, trip_id: Uuid) -> ResultEngine<Vec<Membership>> {
        user_trips::Entity::find()
            .filter(user_trips::Column::TripId.eq(trip_id.to_string()))
            .all(&self.database)
            .await?
            .into_iter()
            .map(Membership::try_from)
            .collect()
    }

    async fn check_membership(&self, trip_id: Uuid, user_id: Uuid) -> ResultEngine<bool> {
        Ok(
            user_trips::Entity::find_by_id(membership_key(trip_id, user_id))
                .one(&self.database)
                .await?
                .is_some(),
        )
    }

    async fn update_display_name(
        &self,
        trip_id: Uuid,
        user_id: Uuid,
        name: &str,
    ) -> ResultEngine<()> {
        let name = name.trim().to_string();
        with_tx!(self, |db_tx| {
            let model = user_trips::Entity::find_by_id(membership_key(trip_id, user_id))
                .one(&db_tx)
                .await?
                .ok_or_else(|| membership_not_found(trip_id, user_id))?;
            let mut active: user_trips::ActiveModel = model.into();
            active.display_name = ActiveValue::Set(name);
            active.update(&db_tx).await?;
            Ok(())
        })
    }

    async fn delete_membership(&self, trip_id: Uuid, user_id: Uuid) -> ResultEngine<()> {
        let res = user_trips::Entity::delete_by_id(membership_key(trip_id, user_id))
            .exec(&self.database)
            .await?;
        if res.rows_affected == 0 {
            return Err(membership_not_found(trip_id, user_id));
        }
        Ok(())
    }

    async fn delete_memberships_by_user(&self, user_id: Uuid) -> ResultEngine<u64> {
        let res = user_trips::Entity::delete_many()
            .filter(user_trips::Column::UserId.eq(user_id.to_string()))
            .exec(&self.database)
            .await?;
        debug!(%user_id, deleted = res.rows_affected, "memberships of user deleted");
        Ok(res.rows_affected)
    }

    async fn delete_memberships_by_trip(&self, trip_id: Uuid) -> ResultEngine<u64> {
        let res = user_trips::Entity::delete_many()
            .filter(user_trips::Column::TripId.eq(trip_id.to_string()))
            .exec(&self.database)
            .await?;
        debug!(%trip_id, deleted = res.rows_affected, "memberships of trip deleted");
        Ok(res.rows_affected)
    }
}
