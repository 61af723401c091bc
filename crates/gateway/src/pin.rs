//! Pin API endpoints

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::Pin;
use axum_extra::extract::WithRejection;
use uuid::Uuid;

use crate::{
    ServerError,
    server::{CurrentUser, ServerState},
    types::{PinCreated, PinNew, PinUpdate},
};

/// Handle requests for adding a pin to a whiteboard
pub async fn create(
    _: Extension<CurrentUser>,
    State(state): State<ServerState>,
    WithRejection(Path(whiteboard_id), _): WithRejection<Path<Uuid>, ServerError>,
    WithRejection(Json(payload), _): WithRejection<Json<PinNew>, ServerError>,
) -> Result<(StatusCode, Json<PinCreated>), ServerError> {
    let pin_id = state
        .orchestrator
        .create_pin(whiteboard_id, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(PinCreated { pin_id })))
}

pub async fn delete(
    _: Extension<CurrentUser>,
    State(state): State<ServerState>,
    WithRejection(Path((whiteboard_id, pin_id)), _): WithRejection<
        Path<(Uuid, Uuid)>,
        ServerError,
    >,
) -> Result<StatusCode, ServerError> {
    state.orchestrator.delete_pin(whiteboard_id, pin_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get(
    _: Extension<CurrentUser>,
    State(state): State<ServerState>,
    WithRejection(Path(pin_id), _): WithRejection<Path<Uuid>, ServerError>,
) -> Result<Json<Pin>, ServerError> {
    Ok(Json(state.orchestrator.pin(pin_id).await?))
}

pub async fn update(
    _: Extension<CurrentUser>,
    State(state): State<ServerState>,
    WithRejection(Path(pin_id), _): WithRejection<Path<Uuid>, ServerError>,
    WithRejection(Json(payload), _): WithRejection<Json<PinUpdate>, ServerError>,
) -> Result<Json<Pin>, ServerError> {
    if payload.is_empty() {
        return Err(ServerError::Generic("no pin fields to update".to_string()));
    }
    Ok(Json(state.orchestrator.update_pin(pin_id, payload).await?))
}

/// Handle requests for the pins the caller takes part in
pub async fn participant(
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<Pin>>, ServerError> {
    Ok(Json(state.orchestrator.participant_pins(user_id).await?))
}
