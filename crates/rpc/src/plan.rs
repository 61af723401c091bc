//! Plan service: pins, whiteboards and trips.

use std::sync::Arc;

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use engine::{CascadeReport, Pin, PinNew, PlanStore, Trip, TripNew, Whiteboard};

use crate::{
    RpcError,
    wire::{
        CountResponse, IdRequest, IdResponse, IdsRequest, PinUpdateRequest, TripUpdateRequest,
        WhiteboardNewRequest, WhiteboardUpdateRequest,
    },
};

type PlanState = State<Arc<dyn PlanStore>>;

pub fn plan_router(store: Arc<dyn PlanStore>) -> Router {
    Router::new()
        .route("/pins/create", post(create_pin))
        .route("/pins/get", post(get_pin))
        .route("/pins/find", post(find_pins))
        .route("/pins/participant", post(find_pins_by_participant))
        .route("/pins/update", post(update_pin))
        .route("/pins/delete", post(delete_pin))
        .route("/pins/delete_many", post(delete_pins))
        .route("/whiteboards/create", post(create_whiteboard))
        .route("/whiteboards/get", post(get_whiteboard))
        .route("/whiteboards/find", post(find_whiteboards))
        .route("/whiteboards/update", post(update_whiteboard))
        .route("/whiteboards/delete", post(delete_whiteboard))
        .route("/whiteboards/delete_cascade", post(delete_whiteboards_cascade))
        .route("/trips/create", post(create_trip))
        .route("/trips/get", post(get_trip))
        .route("/trips/find", post(find_trips))
        .route("/trips/update", post(update_trip))
        .route("/trips/delete", post(delete_trip))
        .with_state(store)
}

async fn create_pin(
    State(store): PlanState,
    Json(payload): Json<PinNew>,
) -> Result<Json<IdResponse>, RpcError> {
    let id = store.create_pin(payload).await?;
    Ok(Json(IdResponse { id }))
}

async fn get_pin(
    State(store): PlanState,
    Json(payload): Json<IdRequest>,
) -> Result<Json<Pin>, RpcError> {
    Ok(Json(store.get_pin(payload.id).await?))
}

async fn find_pins(
    State(store): PlanState,
    Json(payload): Json<IdsRequest>,
) -> Result<Json<Vec<Pin>>, RpcError> {
    Ok(Json(store.find_pins(&payload.ids).await?))
}

async fn find_pins_by_participant(
    State(store): PlanState,
    Json(payload): Json<IdRequest>,
) -> Result<Json<Vec<Pin>>, RpcError> {
    Ok(Json(store.find_pins_by_participant(payload.id).await?))
}

async fn update_pin(
    State(store): PlanState,
    Json(payload): Json<PinUpdateRequest>,
) -> Result<Json<Pin>, RpcError> {
    Ok(Json(store.update_pin(payload.id, payload.update).await?))
}

async fn delete_pin(
    State(store): PlanState,
    Json(payload): Json<IdRequest>,
) -> Result<StatusCode, RpcError> {
    store.delete_pin(payload.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_pins(
    State(store): PlanState,
    Json(payload): Json<IdsRequest>,
) -> Result<Json<CountResponse>, RpcError> {
    let count = store.delete_pins(&payload.ids).await?;
    Ok(Json(CountResponse { count }))
}

async fn create_whiteboard(
    State(store): PlanState,
    Json(payload): Json<WhiteboardNewRequest>,
) -> Result<Json<IdResponse>, RpcError> {
    let id = store
        .create_whiteboard(payload.pin_id, payload.day)
        .await?;
    Ok(Json(IdResponse { id }))
}

async fn get_whiteboard(
    State(store): PlanState,
    Json(payload): Json<IdRequest>,
) -> Result<Json<Whiteboard>, RpcError> {
    Ok(Json(store.get_whiteboard(payload.id).await?))
}

async fn find_whiteboards(
    State(store): PlanState,
    Json(payload): Json<IdsRequest>,
) -> Result<Json<Vec<Whiteboard>>, RpcError> {
    Ok(Json(store.find_whiteboards(&payload.ids).await?))
}

async fn update_whiteboard(
    State(store): PlanState,
    Json(payload): Json<WhiteboardUpdateRequest>,
) -> Result<Json<Whiteboard>, RpcError> {
    Ok(Json(
        store.update_whiteboard(payload.id, payload.update).await?,
    ))
}

async fn delete_whiteboard(
    State(store): PlanState,
    Json(payload): Json<IdRequest>,
) -> Result<StatusCode, RpcError> {
    store.delete_whiteboard(payload.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_whiteboards_cascade(
    State(store): PlanState,
    Json(payload): Json<IdsRequest>,
) -> Result<Json<CascadeReport>, RpcError> {
    Ok(Json(store.delete_whiteboards_cascade(&payload.ids).await?))
}

async fn create_trip(
    State(store): PlanState,
    Json(payload): Json<TripNew>,
) -> Result<Json<IdResponse>, RpcError> {
    let id = store.create_trip(payload).await?;
    Ok(Json(IdResponse { id }))
}

async fn get_trip(
    State(store): PlanState,
    Json(payload): Json<IdRequest>,
) -> Result<Json<Trip>, RpcError> {
    Ok(Json(store.get_trip(payload.id).await?))
}

async fn find_trips(
    State(store): PlanState,
    Json(payload): Json<IdsRequest>,
) -> Result<Json<Vec<Trip>>, RpcError> {
    Ok(Json(store.find_trips(&payload.ids).await?))
}

async fn update_trip(
    State(store): PlanState,
    Json(payload): Json<TripUpdateRequest>,
) -> Result<Json<Trip>, RpcError> {
    Ok(Json(store.update_trip(payload.id, payload.update).await?))
}

async fn delete_trip(
    State(store): PlanState,
    Json(payload): Json<IdRequest>,
) -> Result<StatusCode, RpcError> {
    store.delete_trip(payload.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
