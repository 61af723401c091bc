//! User service: profiles and trip memberships.

use std::sync::Arc;

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use engine::{Membership, User, UserNew, UserStore};
use uuid::Uuid;

use crate::{
    RpcError,
    wire::{
        CountResponse, DisplayNameRequest, IdRequest, IdsRequest, MembershipCheck,
        MembershipRequest, MembershipsNewRequest,
    },
};

type UserState = State<Arc<dyn UserStore>>;

pub fn user_router(store: Arc<dyn UserStore>) -> Router {
    Router::new()
        .route("/users/create", post(create_user))
        .route("/users/get", post(get_user))
        .route("/users/find", post(find_users))
        .route("/users/delete", post(delete_user))
        .route("/memberships/create", post(create_memberships))
        .route("/memberships/trips_for_user", post(trips_for_user))
        .route("/memberships/members_for_trip", post(members_for_trip))
        .route("/memberships/check", post(check_membership))
        .route("/memberships/display_name", post(update_display_name))
        .route("/memberships/delete", post(delete_membership))
        .route("/memberships/delete_by_user", post(delete_memberships_by_user))
        .route("/memberships/delete_by_trip", post(delete_memberships_by_trip))
        .with_state(store)
}

async fn create_user(
    State(store): UserState,
    Json(payload): Json<UserNew>,
) -> Result<Json<User>, RpcError> {
    Ok(Json(store.create_user(payload).await?))
}

async fn get_user(
    State(store): UserState,
    Json(payload): Json<IdRequest>,
) -> Result<Json<User>, RpcError> {
    Ok(Json(store.get_user(payload.id).await?))
}

async fn find_users(
    State(store): UserState,
    Json(payload): Json<IdsRequest>,
) -> Result<Json<Vec<User>>, RpcError> {
    Ok(Json(store.find_users(&payload.ids).await?))
}

async fn delete_user(
    State(store): UserState,
    Json(payload): Json<IdRequest>,
) -> Result<StatusCode, RpcError> {
    store.delete_user(payload.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn create_memberships(
    State(store): UserState,
    Json(payload): Json<MembershipsNewRequest>,
) -> Result<StatusCode, RpcError> {
    store
        .create_memberships(payload.trip_id, &payload.user_ids)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn trips_for_user(
    State(store): UserState,
    Json(payload): Json<IdRequest>,
) -> Result<Json<Vec<Uuid>>, RpcError> {
    Ok(Json(store.trips_for_user(payload.id).await?))
}

async fn members_for_trip(
    State(store): UserState,
    Json(payload): Json<IdRequest>,
) -> Result<Json<Vec<Membership>>, RpcError> {
    Ok(Json(store.members_for_trip(payload.id).await?))
}

async fn check_membership(
    State(store): UserState,
    Json(payload): Json<MembershipRequest>,
) -> Result<Json<MembershipCheck>, RpcError> {
    let member = store
        .check_membership(payload.trip_id, payload.user_id)
        .await?;
    Ok(Json(MembershipCheck { member }))
}

async fn update_display_name(
    State(store): UserState,
    Json(payload): Json<DisplayNameRequest>,
) -> Result<StatusCode, RpcError> {
    store
        .update_display_name(payload.trip_id, payload.user_id, &payload.name)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_membership(
    State(store): UserState,
    Json(payload): Json<MembershipRequest>,
) -> Result<StatusCode, RpcError> {
    store
        .delete_membership(payload.trip_id, payload.user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_memberships_by_user(
    State(store): UserState,
    Json(payload): Json<IdRequest>,
) -> Result<Json<CountResponse>, RpcError> {
    let count = store.delete_memberships_by_user(payload.id).await?;
    Ok(Json(CountResponse { count }))
}

async fn delete_memberships_by_trip(
    State(store): UserState,
    Json(payload): Json<IdRequest>,
) -> Result<Json<CountResponse>, RpcError> {
    let count = store.delete_memberships_by_trip(payload.id).await?;
    Ok(Json(CountResponse { count }))
}
