//! Request and response envelopes of the internal RPC surface.
//!
//! Every call is a `POST` with a JSON body. Calls without a result answer
//! `204 No Content`.

use engine::{PinUpdate, TripUpdate, WhiteboardUpdate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct IdRequest {
    pub id: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IdsRequest {
    pub ids: Vec<Uuid>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IdResponse {
    pub id: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CountResponse {
    pub count: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PinUpdateRequest {
    pub id: Uuid,
    pub update: PinUpdate,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WhiteboardNewRequest {
    pub pin_id: Uuid,
    pub day: i32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WhiteboardUpdateRequest {
    pub id: Uuid,
    pub update: WhiteboardUpdate,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TripUpdateRequest {
    pub id: Uuid,
    pub update: TripUpdate,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MembershipsNewRequest {
    pub trip_id: Uuid,
    pub user_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MembershipRequest {
    pub trip_id: Uuid,
    pub user_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MembershipCheck {
    pub member: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DisplayNameRequest {
    pub trip_id: Uuid,
    pub user_id: Uuid,
    pub name: String,
}
