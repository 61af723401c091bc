use async_trait::async_trait;
use engine::{
    EngineError, Membership, MembershipStore, ProfileStore, ResultEngine, User, UserNew,
};
use uuid::Uuid;

use super::{ClientOptions, HttpClient};
use crate::wire::{
    CountResponse, DisplayNameRequest, IdRequest, IdsRequest, MembershipCheck, MembershipRequest,
    MembershipsNewRequest,
};

/// Remote user store.
#[derive(Clone, Debug)]
pub struct UserClient {
    http: HttpClient,
}

impl UserClient {
    pub fn new(options: ClientOptions) -> ResultEngine<Self> {
        let http = HttpClient::new(options)
            .map_err(|err| EngineError::Unavailable(format!("user client: {err}")))?;
        Ok(Self { http })
    }
}

#[async_trait]
impl ProfileStore for UserClient {
    async fn create_user(&self, user: UserNew) -> ResultEngine<User> {
        Ok(self.http.post_json("/users/create", &user).await?)
    }

    async fn get_user(&self, id: Uuid) -> ResultEngine<User> {
        Ok(self.http.post_json("/users/get", &IdRequest { id }).await?)
    }

    async fn find_users(&self, ids: &[Uuid]) -> ResultEngine<Vec<User>> {
        let body = IdsRequest { ids: ids.to_vec() };
        Ok(self.http.post_json("/users/find", &body).await?)
    }

    async fn delete_user(&self, id: Uuid) -> ResultEngine<()> {
        Ok(self
            .http
            .post_json_unit("/users/delete", &IdRequest { id })
            .await?)
    }
}

#[async_trait]
impl MembershipStore for UserClient {
    async fn create_memberships(&self, trip_id: Uuid, user_ids: &[Uuid]) -> ResultEngine<()> {
        let body = MembershipsNewRequest {
            trip_id,
            user_ids: user_ids.to_vec(),
        };
        Ok(self.http.post_json_unit("/memberships/create", &body).await?)
    }

    async fn trips_for_user(&self, user_id: Uuid) -> ResultEngine<Vec<Uuid>> {
        Ok(self
            .http
            .post_json("/memberships/trips_for_user", &IdRequest { id: user_id })
            .await?)
    }

    async fn members_for_trip(&self, trip_id: Uuid) -> ResultEngine<Vec<Membership>> {
        Ok(self
            .http
            .post_json("/memberships/members_for_trip", &IdRequest { id: trip_id })
            .await?)
    }

    async fn check_membership(&self, trip_id: Uuid, user_id: Uuid) -> ResultEngine<bool> {
        let res: MembershipCheck = self
            .http
            .post_json("/memberships/check", &MembershipRequest { trip_id, user_id })
            .await?;
        Ok(res.member)
    }

    async fn update_display_name(
        &self,
        trip_id: Uuid,
        user_id: Uuid,
        name: &str,
    ) -> ResultEngine<()> {
        let body = DisplayNameRequest {
            trip_id,
            user_id,
            name: name.to_string(),
        };
        Ok(self
            .http
            .post_json_unit("/memberships/display_name", &body)
            .await?)
    }

    async fn delete_membership(&self, trip_id: Uuid, user_id: Uuid) -> ResultEngine<()> {
        Ok(self
            .http
            .post_json_unit("/memberships/delete", &MembershipRequest { trip_id, user_id })
            .await?)
    }

    async fn delete_memberships_by_user(&self, user_id: Uuid) -> ResultEngine<u64> {
        let res: CountResponse = self
            .http
            .post_json("/memberships/delete_by_user", &IdRequest { id: user_id })
            .await?;
        Ok(res.count)
    }

    async fn delete_memberships_by_trip(&self, trip_id: Uuid) -> ResultEngine<u64> {
        let res: CountResponse = self
            .http
            .post_json("/memberships/delete_by_trip", &IdRequest { id: trip_id })
            .await?;
        Ok(res.count)
    }
}
