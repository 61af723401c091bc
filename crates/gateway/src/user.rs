//! User API endpoints

use axum::{Extension, Json, extract::State, http::StatusCode};

use axum_extra::extract::WithRejection;

use crate::{
    ServerError,
    server::{CurrentUser, ServerState},
    types::{User, UserNew},
};

/// Register a new user; the welcome email is queued in the background.
pub async fn register(
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): WithRejection<Json<UserNew>, ServerError>,
) -> Result<(StatusCode, Json<User>), ServerError> {
    let user = state
        .orchestrator
        .register_user(engine::UserNew {
            name: payload.name,
            email: payload.email,
            profile: payload.profile,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Delete the caller and every membership they hold
pub async fn delete(
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    State(state): State<ServerState>,
) -> Result<StatusCode, ServerError> {
    state.orchestrator.delete_user(user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
