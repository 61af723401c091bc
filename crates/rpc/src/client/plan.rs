use async_trait::async_trait;
use engine::{
    CascadeReport, EngineError, Pin, PinNew, PinStore, PinUpdate, ResultEngine, Trip, TripNew,
    TripStore, TripUpdate, Whiteboard, WhiteboardStore, WhiteboardUpdate,
};
use uuid::Uuid;

use super::{ClientOptions, HttpClient};
use crate::wire::{
    CountResponse, IdRequest, IdResponse, IdsRequest, PinUpdateRequest, TripUpdateRequest,
    WhiteboardNewRequest, WhiteboardUpdateRequest,
};

/// Remote plan store.
#[derive(Clone, Debug)]
pub struct PlanClient {
    http: HttpClient,
}

impl PlanClient {
    pub fn new(options: ClientOptions) -> ResultEngine<Self> {
        let http = HttpClient::new(options)
            .map_err(|err| EngineError::Unavailable(format!("plan client: {err}")))?;
        Ok(Self { http })
    }
}

#[async_trait]
impl PinStore for PlanClient {
    async fn create_pin(&self, pin: PinNew) -> ResultEngine<Uuid> {
        let res: IdResponse = self.http.post_json("/pins/create", &pin).await?;
        Ok(res.id)
    }

    async fn get_pin(&self, id: Uuid) -> ResultEngine<Pin> {
        Ok(self.http.post_json("/pins/get", &IdRequest { id }).await?)
    }

    async fn find_pins(&self, ids: &[Uuid]) -> ResultEngine<Vec<Pin>> {
        let body = IdsRequest { ids: ids.to_vec() };
        Ok(self.http.post_json("/pins/find", &body).await?)
    }

    async fn find_pins_by_participant(&self, user_id: Uuid) -> ResultEngine<Vec<Pin>> {
        Ok(self
            .http
            .post_json("/pins/participant", &IdRequest { id: user_id })
            .await?)
    }

    async fn update_pin(&self, id: Uuid, update: PinUpdate) -> ResultEngine<Pin> {
        Ok(self
            .http
            .post_json("/pins/update", &PinUpdateRequest { id, update })
            .await?)
    }

    async fn delete_pin(&self, id: Uuid) -> ResultEngine<()> {
        Ok(self
            .http
            .post_json_unit("/pins/delete", &IdRequest { id })
            .await?)
    }

    async fn delete_pins(&self, ids: &[Uuid]) -> ResultEngine<u64> {
        let body = IdsRequest { ids: ids.to_vec() };
        let res: CountResponse = self.http.post_json("/pins/delete_many", &body).await?;
        Ok(res.count)
    }
}

#[async_trait]
impl WhiteboardStore for PlanClient {
    async fn create_whiteboard(&self, pin_id: Uuid, day: i32) -> ResultEngine<Uuid> {
        let res: IdResponse = self
            .http
            .post_json("/whiteboards/create", &WhiteboardNewRequest { pin_id, day })
            .await?;
        Ok(res.id)
    }

    async fn get_whiteboard(&self, id: Uuid) -> ResultEngine<Whiteboard> {
        Ok(self
            .http
            .post_json("/whiteboards/get", &IdRequest { id })
            .await?)
    }

    async fn find_whiteboards(&self, ids: &[Uuid]) -> ResultEngine<Vec<Whiteboard>> {
        let body = IdsRequest { ids: ids.to_vec() };
        Ok(self.http.post_json("/whiteboards/find", &body).await?)
    }

    async fn update_whiteboard(
        &self,
        id: Uuid,
        update: WhiteboardUpdate,
    ) -> ResultEngine<Whiteboard> {
        Ok(self
            .http
            .post_json(
                "/whiteboards/update",
                &WhiteboardUpdateRequest { id, update },
            )
            .await?)
    }

    async fn delete_whiteboard(&self, id: Uuid) -> ResultEngine<()> {
        Ok(self
            .http
            .post_json_unit("/whiteboards/delete", &IdRequest { id })
            .await?)
    }

    async fn delete_whiteboards_cascade(&self, ids: &[Uuid]) -> ResultEngine<CascadeReport> {
        let body = IdsRequest { ids: ids.to_vec() };
        Ok(self
            .http
            .post_json("/whiteboards/delete_cascade", &body)
            .await?)
    }
}

#[async_trait]
impl TripStore for PlanClient {
    async fn create_trip(&self, trip: TripNew) -> ResultEngine<Uuid> {
        let res: IdResponse = self.http.post_json("/trips/create", &trip).await?;
        Ok(res.id)
    }

    async fn get_trip(&self, id: Uuid) -> ResultEngine<Trip> {
        Ok(self.http.post_json("/trips/get", &IdRequest { id }).await?)
    }

    async fn find_trips(&self, ids: &[Uuid]) -> ResultEngine<Vec<Trip>> {
        let body = IdsRequest { ids: ids.to_vec() };
        Ok(self.http.post_json("/trips/find", &body).await?)
    }

    async fn update_trip(&self, id: Uuid, update: TripUpdate) -> ResultEngine<Trip> {
        Ok(self
            .http
            .post_json("/trips/update", &TripUpdateRequest { id, update })
            .await?)
    }

    async fn delete_trip(&self, id: Uuid) -> ResultEngine<()> {
        Ok(self
            .http
            .post_json_unit("/trips/delete", &IdRequest { id })
            .await?)
    }
}
