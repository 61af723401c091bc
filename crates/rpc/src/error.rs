//! Error bodies of the internal RPC surface.
//!
//! Besides the human readable `error`, every body carries a machine readable
//! `kind`, so a client can rebuild the exact [`EngineError`] variant the
//! service returned.

use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;
use notification::NotificationError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct RpcErrorBody {
    pub error: String,
    #[serde(default)]
    pub kind: String,
}

pub fn status_for_engine_error(err: &EngineError) -> StatusCode {
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

/// Split an error into its wire `kind` and inner message.
fn engine_error_parts(err: EngineError) -> (&'static str, String) {
    match err {
        EngineError::InvalidId(msg) => ("invalid_id", msg),
        EngineError::InvalidInput(msg) => ("invalid_input", msg),
        EngineError::Forbidden(msg) => ("forbidden", msg),
        EngineError::KeyNotFound(msg) => ("not_found", msg),
        EngineError::ExistingKey(msg) => ("existing_key", msg),
        EngineError::Unavailable(msg) => ("unavailable", msg),
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            ("internal", "internal server error".to_string())
        }
    }
}

/// Rebuild the error a service reported.
pub(crate) fn engine_error_from_body(status: u16, body: RpcErrorBody) -> EngineError {
    let RpcErrorBody { error, kind } = body;
    match (kind.as_str(), status) {
        ("invalid_id", _) => EngineError::InvalidId(error),
        ("invalid_input", _) | (_, 422) | (_, 400) => EngineError::InvalidInput(error),
        ("forbidden", _) | (_, 403) => EngineError::Forbidden(error),
        ("not_found", _) | (_, 404) => EngineError::KeyNotFound(error),
        ("existing_key", _) | (_, 409) => EngineError::ExistingKey(error),
        ("unavailable", _) => EngineError::Unavailable(error),
        _ => EngineError::Unavailable(format!("remote store failed ({status}): {error}")),
    }
}

/// Error returned by the RPC handlers.
#[derive(Debug)]
pub enum RpcError {
    Engine(EngineError),
    Notification(NotificationError),
}

impl From<EngineError> for RpcError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

impl From<NotificationError> for RpcError {
    fn from(value: NotificationError) -> Self {
        Self::Notification(value)
    }
}

impl IntoResponse for RpcError {
    fn into_response(self) -> axum::response::Response {
        let (status, kind, error) = match self {
            RpcError::Engine(err) => {
                let status = status_for_engine_error(&err);
                let (kind, error) = engine_error_parts(err);
                (status, kind, error)
            }
            RpcError::Notification(NotificationError::InvalidEvent(msg)) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "invalid_input", msg)
            }
            RpcError::Notification(NotificationError::Unavailable(msg)) => {
                (StatusCode::SERVICE_UNAVAILABLE, "unavailable", msg)
            }
            RpcError::Notification(err) => {
                tracing::error!("notification error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal",
                    "internal server error".to_string(),
                )
            }
        };

        (
            status,
            Json(RpcErrorBody {
                error,
                kind: kind.to_string(),
            }),
        )
            .into_response()
    }
}
