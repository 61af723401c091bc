use async_trait::async_trait;
use sea_orm::{QueryFilter, TransactionTrait, prelude::*};
use tracing::info;
use uuid::Uuid;

use crate::{
    EngineError, ProfileStore, ResultEngine, User, UserNew, order_by_ids, users,
    util::id_strings,
};

use super::{UserEngine, with_tx};

fn user_not_found(id: Uuid) -> EngineError {
    EngineError::KeyNotFound(format!("user {id}"))
}

#[async_trait]
impl ProfileStore for UserEngine {
    async fn create_user(&self, fields: UserNew) -> ResultEngine<User> {
        let user = User::new(fields)?;
        with_tx!(self, |db_tx| {
            let taken = users::Entity::find()
                .filter(users::Column::Email.eq(user.email.clone()))
                .one(&db_tx)
                .await?
                .is_some();
            if taken {
                return Err(EngineError::ExistingKey(user.email.clone()));
            }
            users::ActiveModel::from(&user).insert(&db_tx).await?;
            info!(user_id = %user.id, "user registered");
            Ok(user)
        })
    }

    async fn get_user(&self, id: Uuid) -> ResultEngine<User> {
        let model = users::Entity::find_by_id(id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| user_not_found(id))?;
        User::try_from(model)
    }

    async fn find_users(&self, ids: &[Uuid]) -> ResultEngine<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = users::Entity::find()
            .filter(users::Column::Id.is_in(id_strings(ids)))
            .all(&self.database)
            .await?
            .into_iter()
            .map(User::try_from)
            .collect::<ResultEngine<Vec<_>>>()?;
        Ok(order_by_ids(ids, rows, |user| user.id))
    }

    async fn delete_user(&self, id: Uuid) -> ResultEngine<()> {
        let res = users::Entity::delete_by_id(id.to_string())
            .exec(&self.database)
            .await?;
        if res.rows_affected == 0 {
            return Err(user_not_found(id));
        }
        info!(user_id = %id, "user deleted");
        Ok(())
    }
}
