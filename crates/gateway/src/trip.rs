//! Trip API endpoints

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;
use uuid::Uuid;

use crate::{
    ServerError,
    server::{CurrentUser, ServerState},
    types::{
        Avatar, AvatarRequest, DisplayNameUpdate, MembersNew, TripCreated, TripNew, TripView,
        WhiteboardCreated, WhiteboardNew,
    },
};

/// Handle requests for creating a new trip
pub async fn create(
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): WithRejection<Json<TripNew>, ServerError>,
) -> Result<(StatusCode, Json<TripCreated>), ServerError> {
    let created = state
        .orchestrator
        .create_trip(user_id, &payload.name, &payload.description)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(TripCreated {
            trip_id: created.trip_id,
            whiteboards: vec![created.whiteboard_id],
        }),
    ))
}

pub async fn delete(
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    State(state): State<ServerState>,
    WithRejection(Path(trip_id), _): WithRejection<Path<Uuid>, ServerError>,
) -> Result<StatusCode, ServerError> {
    state.orchestrator.delete_trip(user_id, trip_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get(
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    State(state): State<ServerState>,
    WithRejection(Path(trip_id), _): WithRejection<Path<Uuid>, ServerError>,
) -> Result<Json<TripView>, ServerError> {
    Ok(Json(state.orchestrator.trip_view(user_id, trip_id).await?))
}

/// Handle requests for listing the caller's trips
pub async fn list(
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<engine::Trip>>, ServerError> {
    Ok(Json(state.orchestrator.trips_for(user_id).await?))
}

pub async fn add_whiteboard(
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    State(state): State<ServerState>,
    WithRejection(Path(trip_id), _): WithRejection<Path<Uuid>, ServerError>,
    WithRejection(Json(payload), _): WithRejection<Json<WhiteboardNew>, ServerError>,
) -> Result<(StatusCode, Json<WhiteboardCreated>), ServerError> {
    let (whiteboard_id, pin_id) = state
        .orchestrator
        .add_whiteboard(user_id, trip_id, payload.day)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(WhiteboardCreated {
            whiteboard_id,
            pin_id,
        }),
    ))
}

/// Handle requests for deleting one day of a trip with its pins
pub async fn delete_whiteboard(
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    State(state): State<ServerState>,
    WithRejection(Path((trip_id, whiteboard_id)), _): WithRejection<
        Path<(Uuid, Uuid)>,
        ServerError,
    >,
) -> Result<StatusCode, ServerError> {
    state
        .orchestrator
        .delete_whiteboard(user_id, trip_id, whiteboard_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_members(
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    State(state): State<ServerState>,
    WithRejection(Path(trip_id), _): WithRejection<Path<Uuid>, ServerError>,
    WithRejection(Json(payload), _): WithRejection<Json<MembersNew>, ServerError>,
) -> Result<StatusCode, ServerError> {
    if payload.user_ids.is_empty() {
        return Err(ServerError::Generic("user_ids must not be empty".to_string()));
    }
    state
        .orchestrator
        .add_members(user_id, trip_id, &payload.user_ids)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handle requests for the names and pictures shown for trip members
pub async fn avatars(
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    State(state): State<ServerState>,
    WithRejection(Path(trip_id), _): WithRejection<Path<Uuid>, ServerError>,
    WithRejection(Json(payload), _): WithRejection<Json<AvatarRequest>, ServerError>,
) -> Result<Json<Vec<Avatar>>, ServerError> {
    Ok(Json(
        state
            .orchestrator
            .avatars(user_id, trip_id, &payload.user_ids)
            .await?,
    ))
}

pub async fn display_name(
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    State(state): State<ServerState>,
    WithRejection(Path(trip_id), _): WithRejection<Path<Uuid>, ServerError>,
    WithRejection(Json(payload), _): WithRejection<Json<DisplayNameUpdate>, ServerError>,
) -> Result<StatusCode, ServerError> {
    state
        .orchestrator
        .set_display_name(user_id, trip_id, &payload.name)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
