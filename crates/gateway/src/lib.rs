//! Public HTTP gateway of the trip planner.
//!
//! Callers identify themselves with the `x-user-id` header. Composite writes
//! go through the [`Orchestrator`] sagas; reads are aggregated across the
//! plan and user stores.
use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::IntoResponse,
};
use engine::EngineError;

use api_types::ErrorBody;
pub use orchestrator::{CreatedTrip, Orchestrator, WELCOME_SUBJECT};
pub use saga::{SagaError, SagaPolicy, SagaStep};
pub use server::{CurrentUser, USER_HEADER, router, run_with_listener, spawn_with_listener};

mod orchestrator;
mod pin;
mod saga;
mod server;
mod trip;
mod user;
mod whiteboard;

pub mod types {
    use engine::{Pin, Trip, Whiteboard};
    use serde::{Deserialize, Serialize};

    pub use api_types::{
        membership::{AvatarRequest, DisplayNameUpdate, MembersNew},
        pin::PinCreated,
        trip::{TripCreated, TripNew, WhiteboardCreated, WhiteboardNew},
        user::UserNew,
    };
    pub use engine::{Avatar, PinNew, PinUpdate, User};

    /// A whiteboard with its pins resolved, in `pins` order.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct WhiteboardView {
        #[serde(flatten)]
        pub whiteboard: Whiteboard,
        #[serde(rename = "pin_details")]
        pub pins: Vec<Pin>,
    }

    /// A trip with its whiteboards resolved, in `whiteboards` order.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct TripView {
        #[serde(flatten)]
        pub trip: Trip,
        #[serde(rename = "whiteboard_details")]
        pub whiteboards: Vec<WhiteboardView>,
    }
}

#[derive(Debug)]
pub enum ServerError {
    Engine(EngineError),
    Saga(SagaError),
    Generic(String),
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) => StatusCode::CONFLICT,
        EngineError::InvalidId(_) | EngineError::InvalidInput(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        EngineError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn message_for_engine_error(err: &EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => {
                (status_for_engine_error(&err), message_for_engine_error(&err))
            }
            ServerError::Saga(err) => (
                status_for_engine_error(&err.source),
                format!(
                    "{} failed at step {}: {}",
                    err.saga,
                    err.failed,
                    message_for_engine_error(&err.source)
                ),
            ),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(ErrorBody { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

impl From<SagaError> for ServerError {
    fn from(value: SagaError) -> Self {
        Self::Saga(value)
    }
}

impl From<JsonRejection> for ServerError {
    fn from(value: JsonRejection) -> Self {
        Self::Generic(value.body_text())
    }
}

impl From<PathRejection> for ServerError {
    fn from(value: PathRejection) -> Self {
        Self::Generic(value.body_text())
    }
}
