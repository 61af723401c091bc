//! Notification service: the synchronous `SendEmail` entry point.

use std::sync::Arc;

use api_types::notification::{EmailAccepted, EmailEvent};
use axum::{Json, Router, extract::State, routing::post};
use notification::Notifier;

use crate::RpcError;

pub fn notification_router(notifier: Arc<dyn Notifier>) -> Router {
    Router::new()
        .route("/notification/email", post(send_email))
        .with_state(notifier)
}

/// Answers as soon as the event is queued; delivery happens later.
async fn send_email(
    State(notifier): State<Arc<dyn Notifier>>,
    Json(payload): Json<EmailEvent>,
) -> Result<Json<EmailAccepted>, RpcError> {
    notifier.send_email(payload).await?;
    Ok(Json(EmailAccepted { accepted: true }))
}
