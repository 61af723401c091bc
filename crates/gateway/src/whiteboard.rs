//! Whiteboard API endpoints

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use axum_extra::extract::WithRejection;
use uuid::Uuid;

use crate::{
    ServerError,
    server::{CurrentUser, ServerState},
    types::WhiteboardView,
};

pub async fn get(
    _: Extension<CurrentUser>,
    State(state): State<ServerState>,
    WithRejection(Path(whiteboard_id), _): WithRejection<Path<Uuid>, ServerError>,
) -> Result<Json<WhiteboardView>, ServerError> {
    Ok(Json(state.orchestrator.whiteboard_view(whiteboard_id).await?))
}
